use crate::constants::cm_to_pt;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of a split → booklet → merge job
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BookletOptions {
    /// Largest number of pages a single split may hold
    pub max_pages_per_split: usize,

    /// `false` prepends a blank page so every split starts one page later
    pub same_page_parity: bool,

    /// Margin around detected content and around the sheet columns
    pub margin_cm: f32,

    /// Stamp a marker on the first page of every imposed split
    pub add_watermark: bool,
}

impl Default for BookletOptions {
    fn default() -> Self {
        Self {
            max_pages_per_split: 40,
            same_page_parity: true,
            margin_cm: 1.0,
            add_watermark: true,
        }
    }
}

impl BookletOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| BookletError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BookletError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.max_pages_per_split == 0 {
            return Err(BookletError::Config(
                "Max pages per split must be at least 1".to_string(),
            ));
        }

        self.impose_options().validate()
    }

    /// Imposition settings for each split
    pub fn impose_options(&self) -> ImposeOptions {
        ImposeOptions {
            margin_cm: self.margin_cm,
            add_watermark: self.add_watermark,
        }
    }
}

/// Settings of the booklet imposer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImposeOptions {
    pub margin_cm: f32,
    pub add_watermark: bool,
}

impl Default for ImposeOptions {
    fn default() -> Self {
        BookletOptions::default().impose_options()
    }
}

impl ImposeOptions {
    pub fn margin_pt(&self) -> f32 {
        cm_to_pt(self.margin_cm)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.margin_cm.is_finite() || self.margin_cm < 0.0 {
            return Err(BookletError::Config(format!(
                "Margin must be a non-negative number of centimeters, got {}",
                self.margin_cm
            )));
        }
        Ok(())
    }
}

/// Configuration of a join job
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JoinOptions {
    /// Insert a blank page so each document starts on an odd page
    pub preserve_parity: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            preserve_parity: true,
        }
    }
}

impl JoinOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BookletError::Config(format!("Failed to parse config: {}", e)))
    }
}
