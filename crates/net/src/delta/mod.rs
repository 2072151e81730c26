//! Per-component delta replication.
//!
//! One delta item exists per (replicated component, connected peer) pair on
//! the host and per component on each client. The host side keeps a shadow
//! copy of the last-sent field values and ships only the fields that differ;
//! the client side buffers decoded payloads in a [`HistoryQueue`] and applies
//! them in host-tick order through the component's own mutators, so that
//! component invariants (collision-box lifecycle, pole/tape coupling) fire
//! the same way they do on the host.

mod barrier_tape;

pub use barrier_tape::{BarrierTapeDelta, TapeApplyContext, TapeFields, TapePatch};

use crate::bitstream::{BitReader, BitWriter, BitstreamError};

/// The four-method replication contract every delta item implements.
///
/// Host side calls [`DeltaItem::prepare_for_update`] then, when it returned
/// true (or a fresh peer needs a full sync), [`DeltaItem::update_data`].
/// Client side feeds received payloads through [`DeltaItem::set_data`] and
/// drains them with [`DeltaItem::interpolate`] once per local tick.
pub trait DeltaItem {
    /// Read-only view of the live component, as seen on the host.
    type HostView<'a>;
    /// Mutable surface the receiver applies buffered entries through.
    type ApplyContext<'a>;

    /// Diffs the live component against the shadow copy. Returns true iff at
    /// least one tracked field changed since the last [`DeltaItem::update_data`].
    fn prepare_for_update(&mut self, view: Self::HostView<'_>) -> bool;

    /// Writes one change-flag bit per field group, each followed by the new
    /// value when set, then advances the shadow copy. `force` marks every
    /// group changed regardless of the diff, for a peer's first full sync.
    fn update_data(&mut self, view: Self::HostView<'_>, writer: &mut BitWriter, force: bool);

    /// Decodes one payload and buffers it under the host's tick counter.
    /// Never touches live component state.
    fn set_data(&mut self, reader: &mut BitReader<'_>, tick: u64) -> Result<(), BitstreamError>;

    /// Applies every buffered entry due at the local tick, oldest first.
    /// Future-tagged entries stay buffered.
    fn interpolate(&mut self, ctx: Self::ApplyContext<'_>, tick: u64);
}
