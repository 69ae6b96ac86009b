use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use crate::research::data::models::CompanyProfile;
use crate::research::tools::api::MarketDataProvider;

/// Sector → peer tickers.
pub trait PeerDiscovery : Send + Sync {
  fn peers(&self, sector: &str) -> Vec<String>;
}

pub struct StaticPeerDirectory {
  sectors: HashMap<String, Vec<String>>,
}

impl StaticPeerDirectory {
  pub fn new(sectors: HashMap<String, Vec<String>>) -> Self {
    StaticPeerDirectory { sectors }
  }
}

impl Default for StaticPeerDirectory {
  fn default() -> Self {
    let to_owned = |tickers: &[&str]| tickers.iter().map(|t| t.to_string()).collect::<Vec<String>>();
    StaticPeerDirectory::new(HashMap::from([
      ("Technology".to_string(), to_owned(&["AAPL", "MSFT", "GOOGL", "AMZN", "META"])),
      ("Financial Services".to_string(), to_owned(&["JPM", "BAC", "WFC", "C", "GS"])),
    ]))
  }
}

impl PeerDiscovery for StaticPeerDirectory {
  fn peers(&self, sector: &str) -> Vec<String> {
    self.sectors.get(sector).cloned().unwrap_or_default()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorAverages {
  pub sector: Option<String>,
  pub peer_count: usize,
  pub market_cap: Option<f64>,
  pub beta: Option<f64>,
  pub pe_ratio: Option<f64>,
  pub eps: Option<f64>,
  pub dividend_yield: Option<f64>,
}

/// Mean of the strictly positive values; zeros and negatives would skew the average.
pub fn average_positive<I>(values: I) -> Option<f64> where I: IntoIterator<Item = Option<f64>> {
  let valid: Vec<f64> = values.into_iter().flatten().filter(|v| *v > 0.0 && v.is_finite()).collect();
  if valid.is_empty() {
    return None;
  }
  Some(valid.iter().sum::<f64>() / valid.len() as f64)
}

impl SectorAverages {
  pub fn from_profiles(sector: &str, profiles: &[CompanyProfile]) -> Self {
    SectorAverages {
      sector: Some(sector.to_string()),
      peer_count: profiles.len(),
      market_cap: average_positive(profiles.iter().map(|p| p.market_cap)),
      beta: average_positive(profiles.iter().map(|p| p.beta)),
      pe_ratio: average_positive(profiles.iter().map(|p| p.pe_ratio)),
      eps: average_positive(profiles.iter().map(|p| p.eps)),
      dividend_yield: average_positive(profiles.iter().map(|p| p.dividend_yield)),
    }
  }
}

/// Fetches each peer one after another; peers that fail are left out.
pub async fn sector_averages(market: &dyn MarketDataProvider, discovery: &dyn PeerDiscovery, sector: Option<&str>) -> SectorAverages {
  let sector: &str = match sector {
    Some(sector) if !sector.trim().is_empty() => sector,
    _ => return SectorAverages::default(),
  };

  let tickers: Vec<String> = discovery.peers(sector);
  if tickers.is_empty() {
    log::info!("No peer tickers known for sector: {}", sector);
    return SectorAverages { sector: Some(sector.to_string()), ..SectorAverages::default() };
  }

  let mut profiles: Vec<CompanyProfile> = Vec::new();
  for ticker in &tickers {
    match market.get_company_profile(ticker).await {
      Ok(profile) => profiles.push(profile),
      Err(e) => log::warn!("Error retrieving peer data for {}: {:#}", ticker, e),
    }
  }

  SectorAverages::from_profiles(sector, &profiles)
}
