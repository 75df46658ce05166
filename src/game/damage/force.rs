// Shared impact-force and damage model

use glam::Vec2;

/// Upper bound on damage from a single base-formula hit
pub const MAX_DAMAGE: f32 = 100.0;

/// How a hit lands, scaling the base damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactKind {
    Direct,
    /// Something heavy falling onto the target
    Crush,
    /// Glancing block-on-block contact
    Shear,
    /// Secondary damage from a nearby shattering block
    Chain,
}

impl ImpactKind {
    pub fn multiplier(&self) -> f32 {
        match self {
            Self::Direct => 1.0,
            Self::Crush => 1.5,
            Self::Shear => 1.2,
            Self::Chain => 0.8,
        }
    }
}

/// Collision force estimated from the solver impulse, weighted by the pair's masses
///
/// Vertical contacts count up to 50% more; deep penetration (solver correction
/// rather than a real impact) counts less. The mass term peaks when both
/// masses are equal.
pub fn impact_force(impulse: f32, normal: Vec2, penetration: f32, m1: f32, m2: f32) -> f32 {
    if !impulse.is_finite() || impulse <= 0.0 {
        return 0.0;
    }
    let total_mass = m1 + m2;
    if !total_mass.is_finite() || m1 <= 0.0 || m2 <= 0.0 {
        return 0.0;
    }

    let normal_y = if normal.y.is_finite() { normal.y.abs().min(1.0) } else { 0.0 };
    let penetration = if penetration.is_finite() { penetration.max(0.0) } else { 0.0 };

    let force = impulse / (1.0 + penetration) * (1.0 + 0.5 * normal_y);
    force * (2.0 * m1 * m2) / (total_mass * total_mass)
}

/// Base damage: square root compresses outliers, resistance divides
pub fn base_damage(force: f32, resistance: f32, kind: ImpactKind) -> f32 {
    if !force.is_finite() || force <= 0.0 || resistance <= 0.0 {
        return 0.0;
    }
    let damage = force.sqrt() / 10.0 / resistance * kind.multiplier();
    damage.clamp(0.0, MAX_DAMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_masses_keep_half_force() {
        let force = impact_force(1000.0, Vec2::X, 0.0, 2.0, 2.0);
        assert_relative_eq!(force, 500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_vertical_normal_boosts_force() {
        let flat = impact_force(1000.0, Vec2::X, 0.0, 1.0, 1.0);
        let vertical = impact_force(1000.0, Vec2::Y, 0.0, 1.0, 1.0);
        assert_relative_eq!(vertical / flat, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_penetration_reduces_force() {
        let shallow = impact_force(1000.0, Vec2::X, 0.0, 1.0, 1.0);
        let deep = impact_force(1000.0, Vec2::X, 1.0, 1.0, 1.0);
        assert_relative_eq!(deep, shallow / 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_inputs_give_zero() {
        assert_eq!(impact_force(f32::NAN, Vec2::X, 0.0, 1.0, 1.0), 0.0);
        assert_eq!(impact_force(100.0, Vec2::X, 0.0, 0.0, 1.0), 0.0);
        assert_eq!(base_damage(-5.0, 1.0, ImpactKind::Direct), 0.0);
        assert_eq!(base_damage(100.0, 0.0, ImpactKind::Direct), 0.0);
    }

    #[test]
    fn test_base_damage_formula_and_cap() {
        assert_relative_eq!(
            base_damage(400.0, 1.0, ImpactKind::Direct),
            2.0,
            epsilon = 1e-5
        );
        assert_relative_eq!(base_damage(400.0, 2.0, ImpactKind::Crush), 1.5, epsilon = 1e-5);
        assert_eq!(base_damage(1.0e9, 0.2, ImpactKind::Direct), MAX_DAMAGE);
    }
}
