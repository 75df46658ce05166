// Material, bird and pig property tables
//
// One canonical constant table; every rule in the resolver reads from here.

/// Block material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Ice,
    Wood,
    Stone,
    Metal,
}

/// Fixed properties of a block material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProps {
    /// Starting (and maximum) health
    pub base_health: f32,
    /// Mass of a 40x40 block; also scales crushing force
    pub mass_scale: f32,
    /// Divisor applied to incoming damage
    pub resistance: f32,
    /// Single-hit damage above which supported blocks take collapse damage
    pub stability_threshold: f32,
    /// Susceptibility to chain-reaction damage
    pub chain_multiplier: f32,
    /// Fall speed (px/s) above which a ground impact hurts
    pub fall_threshold: f32,
    /// Chain-reaction radius when destroyed by a bird, for fragile materials
    pub chain_radius: Option<f32>,
    pub restitution: f32,
}

const ICE: MaterialProps = MaterialProps {
    base_health: 30.0,
    mass_scale: 0.3,
    resistance: 0.2,
    stability_threshold: 15.0,
    chain_multiplier: 1.5,
    fall_threshold: 200.0,
    chain_radius: Some(80.0),
    restitution: 0.3,
};

const WOOD: MaterialProps = MaterialProps {
    base_health: 70.0,
    mass_scale: 0.5,
    resistance: 1.0,
    stability_threshold: 35.0,
    chain_multiplier: 1.0,
    fall_threshold: 400.0,
    chain_radius: Some(60.0),
    restitution: 0.4,
};

const STONE: MaterialProps = MaterialProps {
    base_health: 150.0,
    mass_scale: 2.0,
    resistance: 2.5,
    stability_threshold: 60.0,
    chain_multiplier: 0.8,
    fall_threshold: 600.0,
    chain_radius: None,
    restitution: 0.5,
};

const METAL: MaterialProps = MaterialProps {
    base_health: 250.0,
    mass_scale: 3.0,
    resistance: 4.0,
    stability_threshold: 80.0,
    chain_multiplier: 0.5,
    fall_threshold: 800.0,
    chain_radius: None,
    restitution: 0.6,
};

/// Block area whose mass equals `mass_scale`
pub const REFERENCE_BLOCK_AREA: f32 = 40.0 * 40.0;

impl Material {
    pub const ALL: [Material; 4] = [Self::Ice, Self::Wood, Self::Stone, Self::Metal];

    pub fn props(&self) -> &'static MaterialProps {
        match self {
            Self::Ice => &ICE,
            Self::Wood => &WOOD,
            Self::Stone => &STONE,
            Self::Metal => &METAL,
        }
    }

    /// Mass of a block of this material with the given size
    pub fn block_mass(&self, width: f32, height: f32) -> f32 {
        self.props().mass_scale * (width * height) / REFERENCE_BLOCK_AREA
    }

    pub fn is_fragile(&self) -> bool {
        self.props().chain_radius.is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ice => "ice",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Metal => "metal",
        }
    }
}

/// Projectile type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BirdKind {
    /// Small and fast, shatters ice
    Light,
    Balanced,
    /// Big and slow, demolishes wood
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdStats {
    pub radius: f32,
    pub mass: f32,
    pub damage_multiplier: f32,
}

impl BirdKind {
    pub fn stats(&self) -> BirdStats {
        match self {
            Self::Light => BirdStats {
                radius: 8.0,
                mass: 3.0,
                damage_multiplier: 0.6,
            },
            Self::Balanced => BirdStats {
                radius: 12.0,
                mass: 5.0,
                damage_multiplier: 1.0,
            },
            Self::Heavy => BirdStats {
                radius: 14.0,
                mass: 6.0,
                damage_multiplier: 1.8,
            },
        }
    }

    /// Extra multiplier for type/material counters
    pub fn synergy(&self, material: Material) -> f32 {
        match (self, material) {
            (Self::Heavy, Material::Wood) => 2.0,
            (Self::Light, Material::Ice) => 2.5,
            _ => 1.0,
        }
    }
}

/// Target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PigKind {
    Normal,
    /// Helmeted: shrugs off direct hits and survives higher falls
    Armored,
    /// Large and tough
    Elite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PigStats {
    pub radius: f32,
    pub mass: f32,
    pub max_health: f32,
    /// Fraction of direct-hit damage taken
    pub direct_factor: f32,
    /// Fraction of crush damage taken
    pub crush_factor: f32,
    /// Fall speed (px/s) above which a ground impact hurts
    pub fall_threshold: f32,
}

impl PigKind {
    pub fn stats(&self) -> PigStats {
        match self {
            Self::Normal => PigStats {
                radius: 15.0,
                mass: 2.0,
                max_health: 100.0,
                direct_factor: 1.0,
                crush_factor: 1.0,
                fall_threshold: 250.0,
            },
            Self::Armored => PigStats {
                radius: 15.0,
                mass: 3.0,
                max_health: 150.0,
                direct_factor: 0.5,
                crush_factor: 0.75,
                fall_threshold: 350.0,
            },
            Self::Elite => PigStats {
                radius: 20.0,
                mass: 4.0,
                max_health: 200.0,
                direct_factor: 0.7,
                crush_factor: 0.85,
                fall_threshold: 300.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistance_ordering() {
        let r: Vec<f32> = Material::ALL.iter().map(|m| m.props().resistance).collect();
        assert!(r.windows(2).all(|w| w[0] < w[1]), "ice < wood < stone < metal");
    }

    #[test]
    fn test_fall_thresholds_ice_lowest() {
        let ice = Material::Ice.props().fall_threshold;
        for material in &Material::ALL[1..] {
            assert!(ice < material.props().fall_threshold);
        }
    }

    #[test]
    fn test_block_mass_scales_with_area() {
        assert_eq!(Material::Wood.block_mass(40.0, 40.0), 0.5);
        assert_eq!(Material::Stone.block_mass(80.0, 40.0), 4.0);
    }

    #[test]
    fn test_only_ice_and_wood_are_fragile() {
        assert!(Material::Ice.is_fragile());
        assert!(Material::Wood.is_fragile());
        assert!(!Material::Stone.is_fragile());
        assert!(!Material::Metal.is_fragile());
    }

    #[test]
    fn test_bird_synergy() {
        assert_eq!(BirdKind::Heavy.synergy(Material::Wood), 2.0);
        assert_eq!(BirdKind::Light.synergy(Material::Ice), 2.5);
        assert_eq!(BirdKind::Balanced.synergy(Material::Ice), 1.0);
    }

    #[test]
    fn test_tougher_pigs_resist_more() {
        let normal = PigKind::Normal.stats();
        let armored = PigKind::Armored.stats();
        let elite = PigKind::Elite.stats();
        assert!(armored.direct_factor < normal.direct_factor);
        assert!(elite.direct_factor < normal.direct_factor);
        assert!(armored.fall_threshold > normal.fall_threshold);
        assert!(elite.max_health > armored.max_health);
    }
}
