// Level descriptors, validation, and built-in layouts
//
// Descriptors come from outside the engine (static tables here, or any
// generator). Non-finite numbers are rejected; finite values that fall outside
// the arena are clamped into it.

use glam::Vec2;

use crate::game::entities::{BirdKind, Material, PigKind};

pub const ARENA_WIDTH: f32 = 1200.0;
pub const ARENA_HEIGHT: f32 = 700.0;
pub const GROUND_HEIGHT: f32 = 50.0;

pub const MIN_BLOCK_SIZE: f32 = 10.0;
pub const MAX_BLOCK_SIZE: f32 = 300.0;

/// Level construction errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LevelError {
    #[error("{kind} {index} has a non-finite {field}")]
    NonFinite {
        kind: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("Level has no pigs")]
    NoPigs,

    #[error("Level has no birds")]
    NoBirds,

    #[error("Unknown level: {0}")]
    UnknownLevel(u32),
}

/// Playable region (screen space, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub ground_height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            ground_height: GROUND_HEIGHT,
        }
    }
}

impl ArenaConfig {
    /// Y coordinate of the ground surface
    pub fn ground_top(&self) -> f32 {
        self.height - self.ground_height
    }
}

/// Block placed by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDescriptor {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub material: Material,
}

impl BlockDescriptor {
    pub fn new(x: f32, y: f32, width: f32, height: f32, material: Material) -> Self {
        Self {
            x,
            y,
            width,
            height,
            material,
        }
    }
}

/// Pig placed by its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PigDescriptor {
    pub x: f32,
    pub y: f32,
    pub kind: PigKind,
}

impl PigDescriptor {
    pub fn new(x: f32, y: f32, kind: PigKind) -> Self {
        Self { x, y, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelDescriptor {
    pub name: String,
    pub blocks: Vec<BlockDescriptor>,
    pub pigs: Vec<PigDescriptor>,
    /// Birds in launch order
    pub birds: Vec<BirdKind>,
}

/// Block ready to spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBlock {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    pub material: Material,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPig {
    pub center: Vec2,
    pub kind: PigKind,
}

/// Level whose geometry is finite and inside the arena
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLevel {
    pub name: String,
    pub blocks: Vec<PlacedBlock>,
    pub pigs: Vec<PlacedPig>,
    pub birds: Vec<BirdKind>,
}

fn check_finite(kind: &'static str, index: usize, fields: &[(&'static str, f32)]) -> Result<(), LevelError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((field, _)) => Err(LevelError::NonFinite { kind, index, field }),
        None => Ok(()),
    }
}

impl LevelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            pigs: Vec::new(),
            birds: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: BlockDescriptor) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_pig(mut self, pig: PigDescriptor) -> Self {
        self.pigs.push(pig);
        self
    }

    pub fn with_birds(mut self, birds: &[BirdKind]) -> Self {
        self.birds.extend_from_slice(birds);
        self
    }

    /// Validate and clamp every descriptor into `arena`
    pub fn place(&self, arena: &ArenaConfig) -> Result<PlacedLevel, LevelError> {
        if self.pigs.is_empty() {
            return Err(LevelError::NoPigs);
        }
        if self.birds.is_empty() {
            return Err(LevelError::NoBirds);
        }

        let ground_top = arena.ground_top();
        let mut blocks = Vec::with_capacity(self.blocks.len());
        for (index, b) in self.blocks.iter().enumerate() {
            check_finite(
                "block",
                index,
                &[("x", b.x), ("y", b.y), ("width", b.width), ("height", b.height)],
            )?;

            let width = b.width.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE.min(arena.width));
            let height = b.height.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE.min(ground_top));
            let x = b.x.clamp(0.0, arena.width - width);
            let y = b.y.clamp(0.0, ground_top - height);
            if (x, y, width, height) != (b.x, b.y, b.width, b.height) {
                log::warn!("Block {} clamped into the arena", index);
            }

            blocks.push(PlacedBlock {
                center: Vec2::new(x + width / 2.0, y + height / 2.0),
                width,
                height,
                material: b.material,
            });
        }

        let mut pigs = Vec::with_capacity(self.pigs.len());
        for (index, p) in self.pigs.iter().enumerate() {
            check_finite("pig", index, &[("x", p.x), ("y", p.y)])?;

            let radius = p.kind.stats().radius;
            let center = Vec2::new(
                p.x.clamp(radius, arena.width - radius),
                p.y.clamp(radius, ground_top - radius),
            );
            if center != Vec2::new(p.x, p.y) {
                log::warn!("Pig {} clamped into the arena", index);
            }
            pigs.push(PlacedPig { center, kind: p.kind });
        }

        Ok(PlacedLevel {
            name: self.name.clone(),
            blocks,
            pigs,
            birds: self.birds.clone(),
        })
    }

    /// Rough difficulty rating in [200, 2000]
    ///
    /// Rewards total block health, pigs sheltered under or near blocks,
    /// tough pig kinds, structure height, heavy materials and block count.
    pub fn difficulty(&self, arena: &ArenaConfig) -> f32 {
        let mut rating = 1000.0;

        let total_health: f32 = self.blocks.iter().map(|b| b.material.props().base_health).sum();
        rating += (total_health / 10.0).min(300.0);

        for pig in &self.pigs {
            let mut protection = 0.0;
            for block in &self.blocks {
                if block.y < pig.y {
                    protection += 10.0;
                }
                if (block.x - pig.x).abs() < 100.0 {
                    protection += 5.0;
                }
            }
            rating += match pig.kind {
                PigKind::Normal => 0.0,
                PigKind::Armored => 50.0,
                PigKind::Elite => 100.0,
            };
            rating += f32::min(protection, 100.0);
        }

        if let Some(tallest) = self.blocks.iter().map(|b| arena.height - b.y).reduce(f32::max) {
            rating += tallest.min(200.0);
        }

        if !self.blocks.is_empty() {
            let weight: f32 = self
                .blocks
                .iter()
                .map(|b| match b.material {
                    Material::Ice => 0.0,
                    Material::Wood => 1.0,
                    Material::Stone => 2.0,
                    Material::Metal => 3.0,
                })
                .sum();
            rating += weight / self.blocks.len() as f32 * 100.0;
        }

        rating += (self.blocks.len() as f32 * 10.0).min(200.0);
        rating.clamp(200.0, 2000.0)
    }

    /// Single block and pig, for quick checks
    pub fn debug(arena: &ArenaConfig) -> Self {
        let g = arena.ground_top();
        Self::new("debug")
            .with_block(BlockDescriptor::new(800.0, g - 40.0, 40.0, 40.0, Material::Wood))
            .with_pig(PigDescriptor::new(900.0, g - 15.0, PigKind::Normal))
            .with_birds(&[BirdKind::Balanced, BirdKind::Balanced])
    }

    /// Built-in levels, numbered from 1
    pub fn builtin(number: u32, arena: &ArenaConfig) -> Result<Self, LevelError> {
        let g = arena.ground_top();
        let level = match number {
            1 => Self::new("simple castle")
                .with_block(BlockDescriptor::new(700.0, g - 40.0, 40.0, 40.0, Material::Wood))
                .with_block(BlockDescriptor::new(820.0, g - 40.0, 40.0, 40.0, Material::Wood))
                .with_block(BlockDescriptor::new(700.0, g - 140.0, 20.0, 100.0, Material::Wood))
                .with_block(BlockDescriptor::new(840.0, g - 140.0, 20.0, 100.0, Material::Wood))
                .with_block(BlockDescriptor::new(690.0, g - 160.0, 180.0, 20.0, Material::Wood))
                .with_pig(PigDescriptor::new(780.0, g - 175.0, PigKind::Normal))
                .with_birds(&[BirdKind::Balanced; 3]),
            2 => {
                let mut level = Self::new("ice fortress");
                for i in 0..4 {
                    let x = 650.0 + 50.0 * i as f32;
                    level = level.with_block(BlockDescriptor::new(x, g - 30.0, 45.0, 30.0, Material::Ice));
                }
                level
                    .with_block(BlockDescriptor::new(660.0, g - 130.0, 20.0, 100.0, Material::Ice))
                    .with_block(BlockDescriptor::new(810.0, g - 130.0, 20.0, 100.0, Material::Ice))
                    .with_block(BlockDescriptor::new(640.0, g - 145.0, 200.0, 15.0, Material::Wood))
                    .with_block(BlockDescriptor::new(680.0, g - 245.0, 20.0, 100.0, Material::Ice))
                    .with_block(BlockDescriptor::new(780.0, g - 245.0, 20.0, 100.0, Material::Ice))
                    .with_block(BlockDescriptor::new(670.0, g - 260.0, 140.0, 15.0, Material::Ice))
                    .with_pig(PigDescriptor::new(740.0, g - 160.0, PigKind::Normal))
                    .with_pig(PigDescriptor::new(740.0, g - 275.0, PigKind::Armored))
                    .with_birds(&[BirdKind::Light, BirdKind::Balanced, BirdKind::Light, BirdKind::Heavy])
            }
            3 => Self::new("stone keep")
                .with_block(BlockDescriptor::new(680.0, g - 50.0, 60.0, 50.0, Material::Stone))
                .with_block(BlockDescriptor::new(860.0, g - 50.0, 60.0, 50.0, Material::Stone))
                .with_block(BlockDescriptor::new(695.0, g - 200.0, 30.0, 150.0, Material::Stone))
                .with_block(BlockDescriptor::new(875.0, g - 200.0, 30.0, 150.0, Material::Stone))
                .with_block(BlockDescriptor::new(680.0, g - 215.0, 240.0, 15.0, Material::Stone))
                .with_block(BlockDescriptor::new(760.0, g - 100.0, 20.0, 100.0, Material::Wood))
                .with_block(BlockDescriptor::new(840.0, g - 100.0, 20.0, 100.0, Material::Wood))
                .with_block(BlockDescriptor::new(750.0, g - 115.0, 120.0, 15.0, Material::Wood))
                .with_block(BlockDescriptor::new(790.0, g - 155.0, 20.0, 40.0, Material::Metal))
                .with_pig(PigDescriptor::new(770.0, g - 130.0, PigKind::Normal))
                .with_pig(PigDescriptor::new(800.0, g - 235.0, PigKind::Elite))
                .with_birds(&[
                    BirdKind::Balanced,
                    BirdKind::Light,
                    BirdKind::Heavy,
                    BirdKind::Balanced,
                    BirdKind::Heavy,
                ]),
            _ => return Err(LevelError::UnknownLevel(number)),
        };
        Ok(level)
    }
}
