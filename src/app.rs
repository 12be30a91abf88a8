use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::SiteClient;
use crate::config::{Config, SiteConfig};
use crate::refresh::{AutoRefresh, Lifecycle, LoadFn};
use crate::theme::Theme;
use crate::types::*;

/// Everything one site's panels render from. Written by the load callback
/// (possibly from the poll task), read during draw; the lock is only ever
/// held for the copy, never across an await.
#[derive(Default)]
pub struct SiteData {
    pub loading: bool,
    pub prices: Option<PricesResponse>,
    pub analysis: Option<AnalysisResponse>,
    pub tank: Option<TankResponse>,
    pub services: Option<ServicesResponse>,
    /// Optimistic selection, shown until the next analysis fetch overwrites it.
    pub strategy_choice: Option<Strategy>,
}

impl SiteData {
    pub fn display_strategy(&self) -> Option<Strategy> {
        self.strategy_choice
            .or_else(|| self.analysis.as_ref().map(|a| a.strategy))
    }
}

pub struct SiteScreen {
    pub cfg: SiteConfig,
    pub data: Arc<Mutex<SiteData>>,
    pub load: LoadFn,
    pub refresh: AutoRefresh,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub client: SiteClient,
    pub sites: Vec<SiteScreen>,
    pub tab: usize,
    pub input_mode: InputMode,
    pub menu_selected: usize,
    pub quit: bool,
}

impl App {
    pub fn new(config: Config, client: SiteClient, theme: Theme) -> Self {
        let period = Duration::from_secs(config.refresh_interval_secs);
        let sites = config
            .sites
            .iter()
            .map(|cfg| {
                let data = Arc::new(Mutex::new(SiteData::default()));
                let load = make_load(client.clone(), cfg.clone(), Arc::clone(&data));
                SiteScreen {
                    cfg: cfg.clone(),
                    data,
                    load: Arc::clone(&load),
                    refresh: AutoRefresh::with_period(load, period),
                }
            })
            .collect();

        Self {
            config,
            theme,
            client,
            sites,
            tab: 0,
            input_mode: InputMode::Normal,
            menu_selected: 0,
            quit: false,
        }
    }

    pub fn active(&self) -> &SiteScreen {
        &self.sites[self.tab]
    }

    /// Mount the initial screen: immediate load plus armed timer.
    pub async fn mount(&mut self) {
        self.sites[self.tab].refresh.start().await;
    }

    /// Tab switch unmounts the old screen's controller and mounts the new
    /// one, so exactly one timer exists at any time.
    pub async fn select_tab(&mut self, idx: usize) {
        if idx == self.tab || idx >= self.sites.len() {
            return;
        }
        self.sites[self.tab].refresh.stop();
        self.input_mode = InputMode::Normal;
        self.tab = idx;
        self.sites[self.tab].refresh.start().await;
    }

    pub async fn next_tab(&mut self) {
        let next = (self.tab + 1) % self.sites.len();
        self.select_tab(next).await;
    }

    pub async fn refresh_active(&self) {
        self.sites[self.tab].refresh.refresh_now().await;
    }

    /// Manual sync for the visible site. A no-op while one is in flight.
    pub async fn sync_active(&self) {
        let site = &self.sites[self.tab];
        if site.refresh.syncing() {
            return;
        }
        site.refresh.sync(self.client.sync_site(&site.cfg.id)).await;
    }

    pub async fn handle_lifecycle(&mut self, next: Lifecycle) {
        self.sites[self.tab].refresh.handle_lifecycle(next).await;
    }

    pub fn open_strategy_menu(&mut self) {
        let current = self.active().data.lock().unwrap().display_strategy();
        self.menu_selected = current
            .and_then(|s| STRATEGIES.iter().position(|o| *o == s))
            .unwrap_or(0);
        self.input_mode = InputMode::StrategyMenu;
    }

    pub fn close_strategy_menu(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn menu_next(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % STRATEGIES.len();
    }

    pub fn menu_prev(&mut self) {
        self.menu_selected = (self.menu_selected + STRATEGIES.len() - 1) % STRATEGIES.len();
    }

    /// Apply the highlighted strategy: visible state first, then close the
    /// menu, then tell the backend, then reload. The visible update never
    /// waits on the backend's answer.
    pub async fn choose_strategy(&mut self) {
        let strategy = STRATEGIES[self.menu_selected];
        let idx = self.tab;
        {
            let mut d = self.sites[idx].data.lock().unwrap();
            d.strategy_choice = Some(strategy);
            if let Some(a) = d.analysis.as_mut() {
                a.strategy = strategy;
            }
        }
        self.input_mode = InputMode::Normal;
        let _ = self.client.set_strategy(&self.sites[idx].cfg.id, strategy).await;
        (self.sites[idx].load)().await;
    }
}

fn make_load(client: SiteClient, cfg: SiteConfig, data: Arc<Mutex<SiteData>>) -> LoadFn {
    Arc::new(move || {
        let client = client.clone();
        let site_id = cfg.id.clone();
        let kind = cfg.kind;
        let data = Arc::clone(&data);
        Box::pin(async move {
            data.lock().unwrap().loading = true;

            match kind {
                SiteKind::Fuel => {
                    let (prices, analysis, tank) = tokio::join!(
                        client.fetch_prices(&site_id),
                        client.fetch_analysis(&site_id),
                        client.fetch_tank(&site_id),
                    );
                    let mut d = data.lock().unwrap();
                    d.prices = prices;
                    if analysis.is_some() {
                        d.strategy_choice = None;
                    }
                    d.analysis = analysis;
                    d.tank = tank;
                    d.loading = false;
                }
                SiteKind::Auto => {
                    let (analysis, services) = tokio::join!(
                        client.fetch_analysis(&site_id),
                        client.fetch_services(&site_id),
                    );
                    let mut d = data.lock().unwrap();
                    if analysis.is_some() {
                        d.strategy_choice = None;
                    }
                    d.analysis = analysis;
                    d.services = services;
                    d.loading = false;
                }
            }
        })
    })
}

fn log_path() -> std::path::PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    path.push("forecourt");
    path.push("errors.log");
    path
}

pub fn log_error(msg: &str) {
    let path = log_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&path) {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(f, "[{}] {}", now, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(strategy: Strategy) -> AnalysisResponse {
        AnalysisResponse {
            strategy,
            color: AnalysisColor::Green,
            recommendation: String::new(),
            competitors: Vec::new(),
            stats: None,
        }
    }

    #[test]
    fn optimistic_choice_shows_until_fresh_analysis_lands() {
        let mut d = SiteData::default();
        assert_eq!(d.display_strategy(), None);

        d.analysis = Some(analysis(Strategy::Match));
        assert_eq!(d.display_strategy(), Some(Strategy::Match));

        // User picks Undercut; visible immediately.
        d.strategy_choice = Some(Strategy::Undercut);
        assert_eq!(d.display_strategy(), Some(Strategy::Undercut));

        // Next analysis fetch is the source of truth again.
        d.strategy_choice = None;
        d.analysis = Some(analysis(Strategy::Premium));
        assert_eq!(d.display_strategy(), Some(Strategy::Premium));
    }
}
