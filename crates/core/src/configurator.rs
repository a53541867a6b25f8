//! "Build your own shirt" configurator.
//!
//! The [`Wizard`] is a plain value: a [`WizardStep`] plus a
//! [`ConfigurationSelection`]. Every selection is always legal (there are no
//! cross-field rules), steps can be visited in any order, and the price is
//! derived from the fabric alone.
//!
//! ```
//! use threadline_core::configurator::{Fabric, OptionChoice, Wizard};
//!
//! let mut wizard = Wizard::new();
//! assert_eq!(wizard.derived_price().to_string(), "₹1,999.00");
//!
//! wizard.select_option(OptionChoice::Fabric(Fabric::Silk));
//! assert_eq!(wizard.derived_price().to_string(), "₹3,499.00");
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::notification::Notification;
use crate::types::{CurrencyCode, Price};

/// Price of a custom shirt before the fabric surcharge.
pub const BASE_PRICE: i64 = 1999;

/// Currency every configurator price is quoted in.
pub const CURRENCY: CurrencyCode = CurrencyCode::INR;

/// Errors raised when parsing configurator input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfiguratorError {
    #[error("unknown {field} option {value:?}")]
    UnknownOption { field: &'static str, value: String },
    #[error("unknown configurator field {0:?}")]
    UnknownField(String),
    #[error("step {0} is outside 1..=4")]
    StepOutOfRange(i64),
}

/// Defines a closed set of choices with stable string IDs and display names.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($id:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $id)] $variant ),+
        }

        impl $name {
            /// Every choice, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable ID used in forms and sessions.
            #[must_use]
            pub const fn id(self) -> &'static str {
                match self {
                    $(Self::$variant => $id),+
                }
            }

            /// Human-readable name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfiguratorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.id().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| ConfiguratorError::UnknownOption {
                        field: $field,
                        value: s.to_owned(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

choice_enum! {
    /// Shirt fabric; the only selection that affects price.
    Fabric, "fabric" {
        #[default]
        Cotton => ("cotton", "Premium Cotton"),
        Linen => ("linen", "Italian Linen"),
        Silk => ("silk", "Mulberry Silk"),
        Wool => ("wool", "Merino Wool"),
    }
}

impl Fabric {
    /// Surcharge over [`BASE_PRICE`], in whole currency units.
    #[must_use]
    pub const fn surcharge(self) -> i64 {
        match self {
            Self::Cotton => 0,
            Self::Linen => 500,
            Self::Silk => 1500,
            Self::Wool => 1200,
        }
    }

    /// Swatch color shown on the fabric card.
    #[must_use]
    pub const fn swatch(self) -> &'static str {
        match self {
            Self::Cotton => "#F5F5DC",
            Self::Linen => "#E8DCC4",
            Self::Silk => "#F0E6D2",
            Self::Wool => "#D1C4B0",
        }
    }
}

choice_enum! {
    Fit, "fit" {
        Slim => ("slim", "Slim Fit"),
        #[default]
        Regular => ("regular", "Regular Fit"),
        Relaxed => ("relaxed", "Relaxed Fit"),
    }
}

impl Fit {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Slim => "Modern tailored silhouette",
            Self::Regular => "Classic comfortable cut",
            Self::Relaxed => "Easy, laid-back style",
        }
    }
}

choice_enum! {
    Collar, "collar" {
        #[default]
        Classic => ("classic", "Classic Collar"),
        Mandarin => ("mandarin", "Mandarin Collar"),
        ButtonDown => ("button-down", "Button Down"),
        Spread => ("spread", "Spread Collar"),
    }
}

choice_enum! {
    Sleeve, "sleeve" {
        #[default]
        Long => ("long", "Long Sleeve"),
        Short => ("short", "Short Sleeve"),
        RollUp => ("roll-up", "Roll-Up Sleeve"),
    }
}

choice_enum! {
    /// Shirt color; IDs are the hex codes shown in the palette.
    Color, "color" {
        White => ("#FFFFFF", "White"),
        Black => ("#000000", "Black"),
        #[default]
        Navy => ("#1E3A5F", "Navy"),
        SaddleBrown => ("#8B4513", "Saddle Brown"),
        ForestGreen => ("#228B22", "Forest Green"),
        DarkRed => ("#8B0000", "Dark Red"),
        Indigo => ("#4B0082", "Indigo"),
        Slate => ("#2F4F4F", "Slate"),
    }
}

/// The five independent selections that make up a custom shirt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationSelection {
    pub fabric: Fabric,
    pub fit: Fit,
    pub collar: Collar,
    pub sleeve: Sleeve,
    pub color: Color,
}

/// Which selection a form submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionField {
    Fabric,
    Fit,
    Collar,
    Sleeve,
    Color,
}

impl FromStr for OptionField {
    type Err = ConfiguratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fabric" => Ok(Self::Fabric),
            // The fit step is labelled "Style" in the UI.
            "fit" | "style" => Ok(Self::Fit),
            "collar" => Ok(Self::Collar),
            "sleeve" => Ok(Self::Sleeve),
            "color" => Ok(Self::Color),
            _ => Err(ConfiguratorError::UnknownField(s.to_owned())),
        }
    }
}

/// A single typed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChoice {
    Fabric(Fabric),
    Fit(Fit),
    Collar(Collar),
    Sleeve(Sleeve),
    Color(Color),
}

impl OptionChoice {
    /// Parse a field name and option ID, as submitted by the configurator form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfiguratorError`] for an unknown field or option ID.
    pub fn parse(field: &str, value: &str) -> Result<Self, ConfiguratorError> {
        Ok(match field.parse::<OptionField>()? {
            OptionField::Fabric => Self::Fabric(value.parse()?),
            OptionField::Fit => Self::Fit(value.parse()?),
            OptionField::Collar => Self::Collar(value.parse()?),
            OptionField::Sleeve => Self::Sleeve(value.parse()?),
            OptionField::Color => Self::Color(value.parse()?),
        })
    }
}

/// Position in the four-step wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum WizardStep {
    #[default]
    Fabric = 1,
    Style = 2,
    Details = 3,
    Preview = 4,
}

impl WizardStep {
    pub const ALL: [Self; 4] = [Self::Fabric, Self::Style, Self::Details, Self::Preview];

    /// 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Label shown in the step indicator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fabric => "Fabric",
            Self::Style => "Style",
            Self::Details => "Details",
            Self::Preview => "Preview",
        }
    }

    /// The following step, or `self` at the last step.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Fabric => Self::Style,
            Self::Style => Self::Details,
            Self::Details | Self::Preview => Self::Preview,
        }
    }

    /// The preceding step, or `self` at the first step.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Fabric | Self::Style => Self::Fabric,
            Self::Details => Self::Style,
            Self::Preview => Self::Details,
        }
    }
}

impl TryFrom<i64> for WizardStep {
    type Error = ConfiguratorError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::Fabric),
            2 => Ok(Self::Style),
            3 => Ok(Self::Details),
            4 => Ok(Self::Preview),
            other => Err(ConfiguratorError::StepOutOfRange(other)),
        }
    }
}

impl From<WizardStep> for i64 {
    fn from(step: WizardStep) -> Self {
        Self::from(step.number())
    }
}

/// How a step renders in the indicator relative to the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// A finished design handed off by [`Wizard::commit`].
///
/// Custom builds have no backend product, so this is not a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDesign {
    pub selection: ConfigurationSelection,
    pub price: Price,
}

impl CustomDesign {
    /// The toast shown once a design is saved.
    #[must_use]
    pub fn saved_notification(&self) -> Notification {
        Notification::success("Custom design saved!")
            .with_description("This feature will be fully available soon.")
    }
}

/// Wizard state: current step plus the in-progress selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wizard {
    step: WizardStep,
    selection: ConfigurationSelection,
}

impl Wizard {
    /// Step 1 with the default selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current_step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub const fn selection(&self) -> &ConfigurationSelection {
        &self.selection
    }

    /// Advance one step; no-op at the preview step.
    pub const fn next(&mut self) {
        self.step = self.step.next();
    }

    /// Go back one step; no-op at the fabric step.
    pub const fn back(&mut self) {
        self.step = self.step.prev();
    }

    /// Jump straight to any step.
    pub const fn jump_to(&mut self, step: WizardStep) {
        self.step = step;
    }

    /// Overwrite one selection field.
    pub const fn select_option(&mut self, choice: OptionChoice) {
        match choice {
            OptionChoice::Fabric(fabric) => self.selection.fabric = fabric,
            OptionChoice::Fit(fit) => self.selection.fit = fit,
            OptionChoice::Collar(collar) => self.selection.collar = collar,
            OptionChoice::Sleeve(sleeve) => self.selection.sleeve = sleeve,
            OptionChoice::Color(color) => self.selection.color = color,
        }
    }

    /// Parse and apply a form selection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfiguratorError`] if the field or value is unknown; the
    /// selection is left untouched in that case.
    pub fn select(&mut self, field: &str, value: &str) -> Result<(), ConfiguratorError> {
        self.select_option(OptionChoice::parse(field, value)?);
        Ok(())
    }

    /// Base price plus the fabric surcharge.
    #[must_use]
    pub fn derived_price(&self) -> Price {
        Price::whole(BASE_PRICE + self.selection.fabric.surcharge(), CURRENCY)
    }

    /// Indicator state for every step.
    #[must_use]
    pub fn step_states(&self) -> [(WizardStep, StepState); 4] {
        WizardStep::ALL.map(|step| {
            let state = match step.cmp(&self.step) {
                core::cmp::Ordering::Less => StepState::Completed,
                core::cmp::Ordering::Equal => StepState::Current,
                core::cmp::Ordering::Greater => StepState::Upcoming,
            };
            (step, state)
        })
    }

    /// Package the current selection. The wizard itself is left as is.
    #[must_use]
    pub fn commit(&self) -> CustomDesign {
        CustomDesign {
            selection: self.selection,
            price: self.derived_price(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_defaults() {
        let wizard = Wizard::new();
        assert_eq!(wizard.current_step(), WizardStep::Fabric);
        assert_eq!(
            *wizard.selection(),
            ConfigurationSelection {
                fabric: Fabric::Cotton,
                fit: Fit::Regular,
                collar: Collar::Classic,
                sleeve: Sleeve::Long,
                color: Color::Navy,
            }
        );
        assert_eq!(wizard.selection().color.id(), "#1E3A5F");
    }

    #[test]
    fn test_default_and_silk_prices() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.derived_price().amount, Decimal::from(1999));

        wizard.select("fabric", "silk").unwrap();
        assert_eq!(wizard.derived_price().amount, Decimal::from(3499));
    }

    #[test]
    fn test_price_depends_only_on_fabric() {
        for &fabric in Fabric::ALL {
            for &fit in Fit::ALL {
                for &collar in Collar::ALL {
                    for &sleeve in Sleeve::ALL {
                        for &color in Color::ALL {
                            let mut wizard = Wizard::new();
                            wizard.select_option(OptionChoice::Fabric(fabric));
                            wizard.select_option(OptionChoice::Fit(fit));
                            wizard.select_option(OptionChoice::Collar(collar));
                            wizard.select_option(OptionChoice::Sleeve(sleeve));
                            wizard.select_option(OptionChoice::Color(color));

                            assert_eq!(
                                wizard.derived_price(),
                                Price::whole(BASE_PRICE + fabric.surcharge(), CURRENCY)
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_jump_to_any_step_from_any_step() {
        for from in WizardStep::ALL {
            for to in WizardStep::ALL {
                let mut wizard = Wizard::new();
                wizard.jump_to(from);
                wizard.jump_to(to);
                assert_eq!(wizard.current_step(), to);
            }
        }
    }

    #[test]
    fn test_next_and_back_clamp() {
        let mut wizard = Wizard::new();
        wizard.back();
        assert_eq!(wizard.current_step(), WizardStep::Fabric);

        for _ in 0..10 {
            wizard.next();
        }
        assert_eq!(wizard.current_step(), WizardStep::Preview);

        wizard.next();
        assert_eq!(wizard.current_step(), WizardStep::Preview);

        wizard.back();
        assert_eq!(wizard.current_step(), WizardStep::Details);
    }

    #[test]
    fn test_step_out_of_range() {
        assert_eq!(
            WizardStep::try_from(0),
            Err(ConfiguratorError::StepOutOfRange(0))
        );
        assert_eq!(
            WizardStep::try_from(5),
            Err(ConfiguratorError::StepOutOfRange(5))
        );
        assert_eq!(WizardStep::try_from(3), Ok(WizardStep::Details));
    }

    #[test]
    fn test_unknown_selection_leaves_state() {
        let mut wizard = Wizard::new();
        let before = wizard;

        assert!(matches!(
            wizard.select("fabric", "denim"),
            Err(ConfiguratorError::UnknownOption { field: "fabric", .. })
        ));
        assert!(matches!(
            wizard.select("pocket", "chest"),
            Err(ConfiguratorError::UnknownField(_))
        ));
        assert_eq!(wizard, before);
    }

    #[test]
    fn test_style_is_an_alias_for_fit() {
        let mut wizard = Wizard::new();
        wizard.select("style", "slim").unwrap();
        assert_eq!(wizard.selection().fit, Fit::Slim);

        wizard.select("color", "#8b0000").unwrap();
        assert_eq!(wizard.selection().color, Color::DarkRed);
    }

    #[test]
    fn test_step_states() {
        let mut wizard = Wizard::new();
        wizard.jump_to(WizardStep::Details);

        let states: Vec<_> = wizard.step_states().iter().map(|(_, s)| *s).collect();
        assert_eq!(
            states,
            [
                StepState::Completed,
                StepState::Completed,
                StepState::Current,
                StepState::Upcoming
            ]
        );
    }

    #[test]
    fn test_commit_does_not_reset() {
        let mut wizard = Wizard::new();
        wizard.select("fabric", "wool").unwrap();
        wizard.jump_to(WizardStep::Preview);

        let design = wizard.commit();
        assert_eq!(design.price.amount, Decimal::from(3199));
        assert_eq!(design.selection.fabric, Fabric::Wool);
        assert_eq!(wizard.current_step(), WizardStep::Preview);

        let toast = design.saved_notification();
        assert_eq!(toast.message, "Custom design saved!");
        assert_eq!(
            toast.description.as_deref(),
            Some("This feature will be fully available soon.")
        );
    }

    #[test]
    fn test_wizard_serde_roundtrip() {
        let mut wizard = Wizard::new();
        wizard.select("collar", "button-down").unwrap();
        wizard.jump_to(WizardStep::Details);

        let json = serde_json::to_value(wizard).unwrap();
        assert_eq!(json["step"], 3);
        assert_eq!(json["selection"]["collar"], "button-down");

        let parsed: Wizard = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, wizard);
    }
}
