//! Sensor lookup for choosing a session target.

use cblr_protocol::{SensorInfo, routes};

use crate::error::Result;
use crate::transport::Transport;

/// How a lookup string is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorQuery {
	Id(u64),
	Hostname(String),
}

impl SensorQuery {
	/// Numeric input is a sensor id; anything else is a hostname.
	pub fn parse(input: &str) -> Self {
		let input = input.trim();
		match input.parse::<u64>() {
			Ok(id) => SensorQuery::Id(id),
			Err(_) => SensorQuery::Hostname(input.to_string()),
		}
	}
}

#[derive(Debug, Clone)]
pub struct SensorDirectory {
	transport: Transport,
}

impl SensorDirectory {
	pub fn new(transport: Transport) -> Self {
		Self { transport }
	}

	pub async fn lookup(&self, query: &SensorQuery) -> Result<Vec<SensorInfo>> {
		match query {
			SensorQuery::Id(id) => {
				let sensor: SensorInfo = self.transport.get_json(&routes::sensor(*id), &[]).await?;
				Ok(vec![sensor])
			}
			SensorQuery::Hostname(name) => self.search(name).await,
		}
	}

	/// Sensors whose hostname matches `hostname`.
	pub async fn search(&self, hostname: &str) -> Result<Vec<SensorInfo>> {
		self.transport.get_json(routes::SENSORS, &[("hostname", hostname)]).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_input_is_an_id() {
		assert_eq!(SensorQuery::parse(" 42 "), SensorQuery::Id(42));
		assert_eq!(SensorQuery::parse("WS-042"), SensorQuery::Hostname("WS-042".to_string()));
		assert_eq!(SensorQuery::parse("10.0.0.4"), SensorQuery::Hostname("10.0.0.4".to_string()));
	}
}
