// Raw score values, before the combo multiplier

pub const PIG_HIT: f32 = 10.0;
/// Non-lethal crush
pub const PIG_DAMAGED: f32 = 100.0;
pub const PIG_ELIMINATED: f32 = 5000.0;
pub const PIG_CRUSHED: f32 = 3000.0;
pub const PIG_FELL: f32 = 2000.0;

pub const BLOCK_HIT: f32 = 50.0;
pub const BLOCK_DESTROYED: f32 = 500.0;
/// Ice shattering from a hard fall
pub const BLOCK_SHATTERED: f32 = 1000.0;
/// Secondary destruction: block-on-block, falls of non-ice blocks, collapse, tilt
pub const BLOCK_BROKEN: f32 = BLOCK_DESTROYED / 2.0;
pub const CHAIN_REACTION: f32 = 250.0;
pub const STRUCTURE_COLLAPSED: f32 = 2000.0;
