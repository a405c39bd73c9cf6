//! Label conditioning shared by the generator and discriminator
//!
//! The conditional variant feeds the digit label as a float, broadcast across
//! the same number of features as the input it is joined with.

use serde::{Deserialize, Serialize};
use tch::{Kind, Tensor};

use crate::error::{Error, Result};

/// Which GAN flavour a network is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Latent noise only
    #[default]
    Vanilla,
    /// Latent noise plus the class label
    Conditional,
}

impl Variant {
    /// Whether networks of this variant take a condition tensor
    pub fn is_conditional(self) -> bool {
        matches!(self, Variant::Conditional)
    }

    /// Input width once the condition has been concatenated onto `features`
    pub fn input_width(self, features: i64) -> i64 {
        match self {
            Variant::Vanilla => features,
            Variant::Conditional => features * 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Vanilla => "vanilla",
            Variant::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vanilla" => Ok(Variant::Vanilla),
            "conditional" | "cgan" => Ok(Variant::Conditional),
            other => Err(Error::Config(format!("unknown variant '{}'", other))),
        }
    }
}

/// Expand a `[B]` label batch to `[B, width]`
///
/// Fails when the label batch does not have exactly `batch` entries.
pub fn expand_condition(condition: &Tensor, batch: i64, width: i64) -> Result<Tensor> {
    let size = condition.size();
    if size.as_slice() != [batch] {
        return Err(Error::shape("condition", &[batch], &size));
    }
    let c = condition.to_kind(Kind::Float).unsqueeze(1);
    Ok(c.f_expand([batch, width], false)?)
}

/// Concatenate `features` (`[B, F]`) with the expanded condition, or pass
/// `features` through untouched for the vanilla variant
pub fn apply_condition(
    variant: Variant,
    features: Tensor,
    condition: Option<&Tensor>,
) -> Result<Tensor> {
    match (variant, condition) {
        (Variant::Vanilla, None) => Ok(features),
        (Variant::Vanilla, Some(_)) => Err(Error::Condition(
            "vanilla network does not accept a condition".to_string(),
        )),
        (Variant::Conditional, None) => Err(Error::Condition(
            "conditional network requires a condition".to_string(),
        )),
        (Variant::Conditional, Some(c)) => {
            let (batch, width) = features.size2()?;
            let c = expand_condition(c, batch, width)?;
            Ok(Tensor::f_cat(&[features, c], 1)?)
        }
    }
}
