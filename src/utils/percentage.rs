use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);
    pub const FULL: Percentage = Percentage(100.);

    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// How far `value` got towards `target`, capped at 100%.
pub fn progress_percentage(value: f64, target: f64) -> Percentage {
    if target <= 0. {
        return Percentage::FULL;
    }
    Percentage::new_opt((value / target * 100.).min(100.)).unwrap_or(Percentage::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(0., 200.), Percentage::ZERO);
        assert_eq!(*progress_percentage(50., 200.), 25.);
        assert_eq!(progress_percentage(205., 200.), Percentage::FULL);
        assert_eq!(progress_percentage(-1., 200.), Percentage::ZERO);
    }

    #[test]
    fn test_display_rounds_to_whole_percent() {
        assert_eq!(progress_percentage(85.2, 200.).to_string(), "43%");
        assert_eq!(Percentage::FULL.to_string(), "100%");
    }
}
