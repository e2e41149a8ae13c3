//! Endpoint sensor summaries.

use serde::{Deserialize, Serialize};

/// Subset of the sensor record used to pick a live response target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
	pub id: u64,
	#[serde(default)]
	pub computer_name: String,
	#[serde(default)]
	pub os_environment_display_string: String,
	#[serde(default)]
	pub status: String,
}
