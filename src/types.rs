use serde::{Deserialize, Serialize};

/// Pricing policy applied to a site. Wire names are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Match,
    Premium,
    Undercut,
}

pub const STRATEGIES: &[Strategy] = &[Strategy::Match, Strategy::Premium, Strategy::Undercut];

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Match => "Match",
            Strategy::Premium => "Premium",
            Strategy::Undercut => "Undercut",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeStatus {
    Good,
    Warn,
    Bad,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePrice {
    pub label: String,
    // A zero price from the feed means "no reading"; shaping treats it as absent.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<GradeStatus>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesResponse {
    pub site_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub last_updated: String,
    #[serde(default)]
    pub grades: Vec<GradePrice>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    pub distance_mi: f64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    #[serde(default)]
    pub our_price: Option<f64>,
    #[serde(default)]
    pub comp_avg: Option<f64>,
    #[serde(default)]
    pub comp_min: Option<f64>,
    #[serde(default)]
    pub comp_max: Option<f64>,
    #[serde(default)]
    pub margin: Option<String>,
    #[serde(default)]
    pub wholesale_price: Option<f64>,
    #[serde(default)]
    pub wholesale_source: Option<String>,
    #[serde(default)]
    pub wholesale_parsed_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub strategy: Strategy,
    pub color: AnalysisColor,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub stats: Option<AnalysisStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankLevel {
    pub grade: String,
    pub level_pct: f64,
    pub gallons: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankResponse {
    #[serde(default)]
    pub last_sensor_at: Option<String>,
    #[serde(default)]
    pub level_pct: Option<f64>,
    #[serde(default)]
    pub est_days_to_empty: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tanks: Vec<TankLevel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMargins {
    #[serde(default)]
    pub labor: Option<f64>,
    #[serde(default)]
    pub oil: Option<f64>,
    #[serde(default)]
    pub tires: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesResponse {
    pub labor_per_hour: f64,
    pub oil_change: f64,
    pub tires: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub margin: Option<ServiceMargins>,
}

/// What a site's screen is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    /// Fuel station: price grid, market analysis, tank gauges.
    Fuel,
    /// Service shop: service pricing and market analysis only.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    StrategyMenu,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_wire_names_are_exact() {
        let s: Strategy = serde_json::from_str("\"Undercut\"").unwrap();
        assert_eq!(s, Strategy::Undercut);
        assert_eq!(serde_json::to_string(&Strategy::Match).unwrap(), "\"Match\"");
        assert!(serde_json::from_str::<Strategy>("\"match\"").is_err());
    }

    #[test]
    fn analysis_parses_with_absent_optionals() {
        let json = r#"{
            "strategy": "Match",
            "color": "yellow",
            "recommendation": "Hold at current price",
            "competitors": [
                {"name": "Speedway", "distanceMi": 1.2, "price": 2.89, "delta": -0.05},
                {"name": "Kwik Trip", "distanceMi": 0.8, "price": null}
            ]
        }"#;
        let a: AnalysisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(a.color, AnalysisColor::Yellow);
        assert!(a.stats.is_none());
        assert_eq!(a.competitors.len(), 2);
        assert_eq!(a.competitors[0].delta, Some(-0.05));
        assert!(a.competitors[1].price.is_none());
        assert!(a.competitors[1].delta.is_none());
    }

    #[test]
    fn prices_keep_absent_distinct_from_zero() {
        let json = r#"{
            "siteId": "holiday-3851",
            "name": "Holiday 3851",
            "address": "16255 Ipava Ave",
            "lastUpdated": "2024-05-01T12:00:00Z",
            "grades": [
                {"label": "87", "price": 2.79, "status": "good"},
                {"label": "Mid", "price": 0.0},
                {"label": "Premium"}
            ],
            "source": "live-scrape"
        }"#;
        let p: PricesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(p.grades[0].status, Some(GradeStatus::Good));
        assert_eq!(p.grades[1].price, Some(0.0));
        assert!(p.grades[2].price.is_none());
        assert_eq!(p.source.as_deref(), Some("live-scrape"));
    }

    #[test]
    fn tank_tolerates_missing_everything() {
        let t: TankResponse = serde_json::from_str("{}").unwrap();
        assert!(t.level_pct.is_none());
        assert!(t.tanks.is_empty());

        let json = r#"{
            "lastSensorAt": "2024-05-01T09:30:00Z",
            "levelPct": 42.0,
            "estDaysToEmpty": 6.5,
            "tanks": [{"grade": "87", "levelPct": 42.0, "gallons": 8400, "capacity": 20000}]
        }"#;
        let t: TankResponse = serde_json::from_str(json).unwrap();
        assert_eq!(t.tanks.len(), 1);
        assert_eq!(t.tanks[0].capacity, 20000.0);
    }

    #[test]
    fn services_parses_without_margin() {
        let json = r#"{"laborPerHour": 95, "oilChange": 49.99, "tires": 520, "rating": 4.6}"#;
        let s: ServicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(s.labor_per_hour, 95.0);
        assert!(s.margin.is_none());
    }
}
