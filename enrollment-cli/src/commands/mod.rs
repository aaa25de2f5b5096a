//! CLI command implementations.

pub mod routes;
pub mod serve;

mod colors {
    use colored::CustomColor;

    pub fn mauve() -> CustomColor {
        CustomColor::new(203, 166, 247)
    }

    pub fn lavender() -> CustomColor {
        CustomColor::new(180, 190, 254)
    }

    pub fn sky() -> CustomColor {
        CustomColor::new(137, 220, 235)
    }

    pub fn subtext() -> CustomColor {
        CustomColor::new(166, 173, 200)
    }

    pub fn green() -> CustomColor {
        CustomColor::new(166, 227, 161)
    }

    pub fn peach() -> CustomColor {
        CustomColor::new(250, 179, 135)
    }

    pub fn red() -> CustomColor {
        CustomColor::new(243, 139, 168)
    }
}
