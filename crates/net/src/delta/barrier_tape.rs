use bitflags::bitflags;
use glam::Vec3;

use cordon_core::{
    BarrierTapeComponent, EntityId, PoleIndex, Scene, TapeConnection, TerrainOracle,
};

use crate::bitstream::{BitReader, BitWriter, BitstreamError};
use crate::delta::DeltaItem;
use crate::history::HistoryQueue;

bitflags! {
    /// Tracks which field groups of a [`BarrierTapeComponent`] changed since
    /// the last send to one peer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TapeFields: u8 {
        const POLE_FIRST  = 1 << 0;
        const POLE_SECOND = 1 << 1;
        const TAPE        = 1 << 2;
        const FINISHED    = 1 << 3;
        const BARRIER     = 1 << 4;
    }
}

impl TapeFields {
    fn pole(index: PoleIndex) -> Self {
        match index {
            PoleIndex::First => Self::POLE_FIRST,
            PoleIndex::Second => Self::POLE_SECOND,
        }
    }
}

/// Replicated per-pole state: world position and transparency.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PoleShadow {
    position: Vec3,
    transparency: f32,
}

/// Replicated tape-segment state, only meaningful while a tape exists.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TapeWire {
    connection: TapeConnection,
    police: Option<EntityId>,
    transparency: f32,
}

/// Last field values acknowledged to the peer.
#[derive(Clone, Debug, Default, PartialEq)]
struct TapeShadow {
    poles: [Option<PoleShadow>; 2],
    tape: Option<TapeWire>,
    finished: bool,
    barrier: bool,
}

impl TapeShadow {
    fn capture(tape: &BarrierTapeComponent, scene: &Scene) -> Self {
        let mut poles = [None, None];
        for index in PoleIndex::ALL {
            if let Some(pole) = tape.pole(index) {
                poles[index.as_usize()] = Some(PoleShadow {
                    position: tape.pole_position(scene, index).unwrap_or(Vec3::ZERO),
                    transparency: pole.transparency,
                });
            }
        }
        Self {
            poles,
            tape: tape.tape().map(|tape| TapeWire {
                connection: tape.connection,
                police: tape.police_entity,
                transparency: tape.transparency,
            }),
            finished: tape.is_finished_building(),
            barrier: tape.is_barrier(),
        }
    }
}

/// One decoded update. The outer `Option` is wire presence (the change flag
/// was set); the inner `Option` is existence of the pole or tape itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TapePatch {
    poles: [Option<Option<PoleShadow>>; 2],
    tape: Option<Option<TapeWire>>,
    finished: Option<bool>,
    barrier: Option<bool>,
}

/// Mutable surface the receiver applies buffered tape updates through.
pub struct TapeApplyContext<'a> {
    pub tape: &'a mut BarrierTapeComponent,
    pub scene: &'a mut Scene,
    pub terrain: &'a dyn TerrainOracle,
}

/// Delta replication state for one barrier-tape component and one peer.
#[derive(Default)]
pub struct BarrierTapeDelta {
    shadow: TapeShadow,
    dirty: TapeFields,
    history: HistoryQueue<TapePatch>,
}

impl BarrierTapeDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries buffered on the receive side, waiting for their tick.
    pub fn pending(&self) -> usize {
        self.history.len()
    }

    fn write_pole(writer: &mut BitWriter, pole: Option<&PoleShadow>) {
        writer.write_bit(pole.is_some());
        if let Some(pole) = pole {
            writer.write_f32(pole.position.x);
            writer.write_f32(pole.position.y);
            writer.write_f32(pole.position.z);
            writer.write_f32(pole.transparency);
        }
    }

    fn read_pole(reader: &mut BitReader<'_>) -> Result<Option<PoleShadow>, BitstreamError> {
        if !reader.read_bit()? {
            return Ok(None);
        }
        let position = Vec3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?);
        let transparency = reader.read_f32()?;
        Ok(Some(PoleShadow {
            position,
            transparency,
        }))
    }

    fn write_tape(writer: &mut BitWriter, tape: Option<&TapeWire>) {
        writer.write_bit(tape.is_some());
        if let Some(tape) = tape {
            writer.write_bit(tape.connection == TapeConnection::PoleToSquad);
            writer.write_bit(tape.police.is_some());
            if let Some(police) = tape.police {
                writer.write_u32(police.0);
            }
            writer.write_f32(tape.transparency);
        }
    }

    fn read_tape(reader: &mut BitReader<'_>) -> Result<Option<TapeWire>, BitstreamError> {
        if !reader.read_bit()? {
            return Ok(None);
        }
        let connection = if reader.read_bit()? {
            TapeConnection::PoleToSquad
        } else {
            TapeConnection::PoleToPole
        };
        let police = if reader.read_bit()? {
            Some(EntityId(reader.read_u32()?))
        } else {
            None
        };
        let transparency = reader.read_f32()?;
        Ok(Some(TapeWire {
            connection,
            police,
            transparency,
        }))
    }

    /// Applies one decoded entry through the component mutators. Every
    /// mutator is a no-op on unchanged state, so replaying an entry the
    /// component already matches changes nothing; mutator errors from a
    /// partially synced component are tolerated and corrected by later
    /// entries.
    fn apply(ctx: &mut TapeApplyContext<'_>, patch: &TapePatch) {
        for index in PoleIndex::ALL {
            let Some(state) = &patch.poles[index.as_usize()] else {
                continue;
            };
            match state {
                Some(pole) => {
                    // The host may carry only its second pole after destroying
                    // the first, so fill the slot directly rather than going
                    // through the order-checked create path.
                    ctx.tape.restore_pole(ctx.scene, index);
                    let _ = ctx
                        .tape
                        .move_pole(ctx.scene, ctx.terrain, index, pole.position);
                    let _ = ctx.tape.set_pole_transparency(index, pole.transparency);
                }
                None => ctx.tape.destroy_pole(ctx.scene, index),
            }
        }

        if let Some(state) = &patch.tape {
            match state {
                Some(tape) => {
                    let _ = ctx.tape.create_tape(ctx.scene, tape.connection, tape.police);
                    let _ = ctx.tape.set_tape_transparency(tape.transparency);
                }
                None => ctx.tape.destroy_tape(ctx.scene),
            }
        }

        if let Some(finished) = patch.finished {
            ctx.tape.set_finished_building(finished);
        }
        if let Some(barrier) = patch.barrier {
            ctx.tape.set_barrier(ctx.scene, barrier);
        }
    }
}

impl DeltaItem for BarrierTapeDelta {
    type HostView<'a> = (&'a BarrierTapeComponent, &'a Scene);
    type ApplyContext<'a> = TapeApplyContext<'a>;

    fn prepare_for_update(&mut self, (tape, scene): Self::HostView<'_>) -> bool {
        let live = TapeShadow::capture(tape, scene);
        let mut dirty = TapeFields::empty();

        for index in PoleIndex::ALL {
            if live.poles[index.as_usize()] != self.shadow.poles[index.as_usize()] {
                dirty |= TapeFields::pole(index);
            }
        }
        if live.tape != self.shadow.tape {
            dirty |= TapeFields::TAPE;
        }
        if live.finished != self.shadow.finished {
            dirty |= TapeFields::FINISHED;
        }
        if live.barrier != self.shadow.barrier {
            dirty |= TapeFields::BARRIER;
        }

        self.dirty = dirty;
        !dirty.is_empty()
    }

    fn update_data(&mut self, (tape, scene): Self::HostView<'_>, writer: &mut BitWriter, force: bool) {
        let live = TapeShadow::capture(tape, scene);

        for index in PoleIndex::ALL {
            let changed = force || self.dirty.contains(TapeFields::pole(index));
            writer.write_bit(changed);
            if changed {
                Self::write_pole(writer, live.poles[index.as_usize()].as_ref());
            }
        }

        let changed = force || self.dirty.contains(TapeFields::TAPE);
        writer.write_bit(changed);
        if changed {
            Self::write_tape(writer, live.tape.as_ref());
        }

        let changed = force || self.dirty.contains(TapeFields::FINISHED);
        writer.write_bit(changed);
        if changed {
            writer.write_bit(live.finished);
        }

        let changed = force || self.dirty.contains(TapeFields::BARRIER);
        writer.write_bit(changed);
        if changed {
            writer.write_bit(live.barrier);
        }

        self.shadow = live;
        self.dirty = TapeFields::empty();
    }

    fn set_data(&mut self, reader: &mut BitReader<'_>, tick: u64) -> Result<(), BitstreamError> {
        let mut patch = TapePatch::default();

        for index in PoleIndex::ALL {
            if reader.read_bit()? {
                patch.poles[index.as_usize()] = Some(Self::read_pole(reader)?);
            }
        }
        if reader.read_bit()? {
            patch.tape = Some(Self::read_tape(reader)?);
        }
        if reader.read_bit()? {
            patch.finished = Some(reader.read_bit()?);
        }
        if reader.read_bit()? {
            patch.barrier = Some(reader.read_bit()?);
        }

        self.history.push(tick, patch);
        Ok(())
    }

    fn interpolate(&mut self, mut ctx: Self::ApplyContext<'_>, tick: u64) {
        while let Some(patch) = self.history.pop_due(tick) {
            Self::apply(&mut ctx, &patch);
        }
    }
}
