use beanmatch_core::flavor::{FlavorTerm, FlavorVector, AXES};
use beanmatch_core::vector::round3;

/// Sharpens each bipolar axis of a flavor profile.
pub struct ContrastEnhancer;

impl ContrastEnhancer {
    /// For every axis with `delta = |left - right| > 0`, moves the stronger
    /// pole up and the weaker pole down by `delta * factor` (saturating at
    /// 1 and 0). Equal poles are left as they are. Output is rounded to three
    /// decimals.
    ///
    /// Not idempotent: a second pass widens the gap again.
    pub fn enhance(vector: &FlavorVector, factor: f32) -> FlavorVector {
        let factor = factor.clamp(0.0, 1.0);
        let mut out = *vector;
        for axis in &AXES {
            let (l, r) = (out.get(axis.left), out.get(axis.right));
            if l == r {
                continue;
            }
            let (stronger, weaker) = if l > r { (axis.left, axis.right) } else { (axis.right, axis.left) };
            let shift = (l - r).abs() * factor;
            out.set(stronger, (out.get(stronger) + shift).min(1.0));
            out.set(weaker, (out.get(weaker) - shift).max(0.0));
        }
        for term in FlavorTerm::ALL {
            out.set(term, round3(out.get(term)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pairs: &[(FlavorTerm, f32)]) -> FlavorVector {
        let mut v = FlavorVector::uniform(0.5);
        for (t, s) in pairs {
            v.set(*t, *s);
        }
        v
    }

    #[test]
    fn balanced_axes_are_unchanged() {
        let v = profile(&[(FlavorTerm::Sweet, 0.7), (FlavorTerm::Bitter, 0.7), (FlavorTerm::Floral, 0.2), (FlavorTerm::Wood, 0.2)]);
        assert_eq!(ContrastEnhancer::enhance(&v, 1.0), v);
        assert_eq!(ContrastEnhancer::enhance(&v, 0.3), v);
    }

    #[test]
    fn stronger_pole_moves_up_weaker_moves_down() {
        let v = profile(&[(FlavorTerm::Sweet, 0.6), (FlavorTerm::Bitter, 0.4)]);
        let out = ContrastEnhancer::enhance(&v, 0.5);
        assert!((out.get(FlavorTerm::Sweet) - 0.7).abs() < 1e-6);
        assert!((out.get(FlavorTerm::Bitter) - 0.3).abs() < 1e-6);
        assert_eq!(out.get(FlavorTerm::Acid), 0.5);
    }

    #[test]
    fn shift_saturates_at_bounds() {
        let v = profile(&[(FlavorTerm::Citrus, 0.9), (FlavorTerm::Chocolate, 0.3)]);
        let out = ContrastEnhancer::enhance(&v, 1.0);
        assert_eq!(out.get(FlavorTerm::Citrus), 1.0);
        assert_eq!(out.get(FlavorTerm::Chocolate), 0.0);
    }

    #[test]
    fn zero_factor_only_rounds() {
        let v = profile(&[(FlavorTerm::Fruit, 0.61), (FlavorTerm::Nut, 0.42)]);
        assert_eq!(ContrastEnhancer::enhance(&v, 0.0), v);
    }

    #[test]
    fn second_pass_widens_the_gap() {
        let v = profile(&[(FlavorTerm::Acid, 0.55), (FlavorTerm::Smooth, 0.45)]);
        let once = ContrastEnhancer::enhance(&v, 1.0);
        let twice = ContrastEnhancer::enhance(&once, 1.0);
        assert_ne!(once, twice);
        let gap = |p: &FlavorVector| p.get(FlavorTerm::Acid) - p.get(FlavorTerm::Smooth);
        assert!(gap(&twice) > gap(&once));
    }
}
