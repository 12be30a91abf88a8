use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, SiteData};
use crate::theme::Theme;
use crate::types::*;
use crate::ui::format::{
    format_delta, format_gallons, format_price, format_wire_time, gauge_tier,
};

pub fn draw(f: &mut Frame, app: &App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.bg));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // top bar
            Constraint::Min(8),    // site screen
            Constraint::Length(1), // bottom bar
        ])
        .split(f.area());

    draw_top_bar(f, app, chunks[0]);
    draw_site(f, app, chunks[1]);
    draw_bottom_bar(f, app, chunks[2]);

    if app.input_mode == InputMode::StrategyMenu {
        draw_strategy_menu(f, app);
    }
}

// -- Top bar --

fn draw_top_bar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " forecourt ",
        Style::default().fg(t.title).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("\u{26fd} ", Style::default().fg(t.dim)));

    for (i, site) in app.sites.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" \u{b7} ", Style::default().fg(t.dim)));
        }
        if i == app.tab {
            spans.push(Span::styled(
                site.cfg.name.as_str(),
                Style::default().fg(t.title).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(site.cfg.name.as_str(), Style::default().fg(t.dim)));
        }
    }

    // Right-align the refresh status.
    let site = app.active();
    let status = if site.refresh.syncing() {
        Some(("syncing...".to_string(), t.accent))
    } else if site.data.lock().unwrap().loading {
        Some(("loading...".to_string(), t.dim))
    } else {
        site.refresh.last_updated_text().map(|s| (s, t.dim))
    };

    if let Some((text, color)) = status {
        // Display columns, not bytes: the bar holds wide/multibyte glyphs.
        let used: usize = spans.iter().map(|s| s.width()).sum();
        let status_span = Span::styled(text, Style::default().fg(color));
        let pad = (area.width as usize).saturating_sub(used + status_span.width() + 1);
        if pad > 0 {
            spans.push(Span::raw(" ".repeat(pad)));
        }
        spans.push(status_span);
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(t.border)),
    );
    f.render_widget(bar, area);
}

// -- Site screen --

fn draw_site(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let site = app.active();
    let d = site.data.lock().unwrap();

    match site.cfg.kind {
        SiteKind::Fuel => {
            let tanks = d.tank.as_ref().map(|tk| tk.tanks.len()).unwrap_or(0);
            let tank_height = (4 + tanks as u16 * 2).min(area.height / 2);
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),           // header
                    Constraint::Length(6),           // price grid
                    Constraint::Min(7),              // analysis
                    Constraint::Length(tank_height), // tanks
                ])
                .split(area);

            draw_header(f, t, &site.cfg, &d, chunks[0]);
            draw_price_grid(f, t, &d, chunks[1]);
            draw_analysis(f, t, &d, chunks[2]);
            draw_tank(f, t, &d, chunks[3]);
        }
        SiteKind::Auto => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // header
                    Constraint::Length(7), // service pricing
                    Constraint::Min(7),    // analysis
                ])
                .split(area);

            draw_header(f, t, &site.cfg, &d, chunks[0]);
            draw_services(f, t, &d, chunks[1]);
            draw_analysis(f, t, &d, chunks[2]);
        }
    }
}

fn draw_header(f: &mut Frame, t: &Theme, cfg: &crate::config::SiteConfig, d: &SiteData, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {}", cfg.company),
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", cfg.name), Style::default().fg(t.fg)),
    ])];

    if let Some(ref addr) = cfg.address {
        lines.push(Line::from(Span::styled(
            format!(" {}", addr),
            Style::default().fg(t.dim),
        )));
    }

    // Live/cached indicator from the prices feed.
    if let Some(source) = d.prices.as_ref().and_then(|p| p.source.as_deref()) {
        let (color, label) = if source.contains("live") {
            (t.ok, "Live data")
        } else {
            (t.warn, "Cached data")
        };
        lines.push(Line::from(vec![
            Span::styled(" \u{25cf} ", Style::default().fg(color)),
            Span::styled(label, Style::default().fg(t.dim)),
            Span::styled(format!(" ({})", source), Style::default().fg(t.dim)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

// -- Price grid --

fn draw_price_grid(f: &mut Frame, t: &Theme, d: &SiteData, area: Rect) {
    // Placeholder cards until the first successful fetch.
    let placeholder: Vec<GradePrice> = ["87", "Mid", "Premium", "Diesel"]
        .iter()
        .map(|label| GradePrice {
            label: label.to_string(),
            price: None,
            status: None,
            source: None,
        })
        .collect();

    let (grades, updated_at) = match d.prices.as_ref() {
        Some(p) if !p.grades.is_empty() => (&p.grades, Some(format_wire_time(&p.last_updated))),
        _ => (&placeholder, None),
    };

    let constraints: Vec<Constraint> = grades
        .iter()
        .map(|_| Constraint::Ratio(1, grades.len() as u32))
        .collect();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (grade, card) in grades.iter().zip(cards.iter()) {
        let border = t.grade_status_color(grade.status);
        let block = Block::default()
            .title(format!(" {} ", grade.label))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(*card);
        f.render_widget(block, *card);

        // Zero is a missing reading, same as absent.
        let price = format_price(grade.price.filter(|p| *p > 0.0));
        let mut lines = vec![Line::from(Span::styled(
            format!(" {}", price),
            Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
        ))];
        if let Some(ref source) = grade.source {
            lines.push(Line::from(Span::styled(
                format!(" {}", source),
                Style::default().fg(t.dim),
            )));
        }
        if let Some(ref at) = updated_at {
            lines.push(Line::from(Span::styled(
                format!(" Updated {}", at),
                Style::default().fg(t.dim),
            )));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }
}

// -- Market analysis card --

fn draw_analysis(f: &mut Frame, t: &Theme, d: &SiteData, area: Rect) {
    let badge = d
        .display_strategy()
        .map(|s| s.label())
        .unwrap_or("Select");
    let badge_color = d
        .analysis
        .as_ref()
        .map(|a| t.analysis_color(a.color))
        .unwrap_or(t.dim);

    let block = Block::default()
        .title(" Market Analysis ")
        .title_style(Style::default().fg(t.title).add_modifier(Modifier::BOLD))
        .title(
            Line::from(Span::styled(
                format!(" {} \u{25be} ", badge),
                Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Right),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let analysis = match d.analysis.as_ref() {
        Some(a) => a,
        None => {
            let msg = Paragraph::new(" Market analysis unavailable (mock API not reachable).")
                .style(Style::default().fg(t.dim));
            f.render_widget(msg, inner);
            return;
        }
    };

    let color = t.analysis_color(analysis.color);
    let comp_rows = analysis.competitors.len().min(5) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // recommendation
            Constraint::Length(1),             // stats row
            Constraint::Length(1),             // competitors header
            Constraint::Length(comp_rows),     // competitors
            Constraint::Length(1),             // wholesale
            Constraint::Min(0),
        ])
        .split(inner);

    let reco = Paragraph::new(format!(
        " {}: {}",
        analysis.strategy.label(),
        analysis.recommendation
    ))
    .style(Style::default().fg(color));
    f.render_widget(reco, chunks[0]);

    if let Some(stats) = analysis.stats.as_ref() {
        let mut spans: Vec<Span> = Vec::new();
        if let Some(ref margin) = stats.margin {
            spans.push(Span::styled(
                format!(" Margin/gal: {}\u{a2} ", margin),
                Style::default().fg(t.fg),
            ));
        }
        if let Some(avg) = stats.comp_avg {
            spans.push(Span::styled(
                format!(" Comp Avg: {} ", format_price(Some(avg))),
                Style::default().fg(t.fg),
            ));
        }
        if let Some(ours) = stats.our_price {
            spans.push(Span::styled(
                format!(" Our 87: {} ", format_price(Some(ours))),
                Style::default().fg(t.fg),
            ));
        }
        if let (Some(min), Some(max)) = (stats.comp_min, stats.comp_max) {
            spans.push(Span::styled(
                format!(" Range: {}-{} ", format_price(Some(min)), format_price(Some(max))),
                Style::default().fg(t.dim),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }

    if !analysis.competitors.is_empty() {
        let header = Paragraph::new(" COMPETITORS (5MI RADIUS)")
            .style(Style::default().fg(t.dim));
        f.render_widget(header, chunks[2]);

        let rows: Vec<Row> = analysis
            .competitors
            .iter()
            .take(5)
            .map(|c| {
                let price = match c.price {
                    Some(p) => format_price(Some(p)),
                    None => "--".to_string(),
                };
                let delta = if c.price.is_some() {
                    format_delta(c.delta)
                } else {
                    String::new()
                };
                let delta_color = match c.delta {
                    Some(v) if v >= 0.0 => t.ok,
                    Some(_) => t.critical,
                    None => t.dim,
                };
                Row::new(vec![
                    Cell::from(format!(" {}", c.name)).style(Style::default().fg(t.fg)),
                    Cell::from(format!("{:.1} mi", c.distance_mi))
                        .style(Style::default().fg(t.dim)),
                    Cell::from(price).style(Style::default().fg(t.fg)),
                    Cell::from(delta).style(Style::default().fg(delta_color)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(14),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(6),
            ],
        )
        .column_spacing(1);
        f.render_widget(table, chunks[3]);
    }

    if let Some(stats) = analysis.stats.as_ref() {
        if let Some(wholesale) = stats.wholesale_price {
            let mut spans = vec![
                Span::styled(" Wholesale: ", Style::default().fg(t.dim)),
                Span::styled(format_price(Some(wholesale)), Style::default().fg(t.fg)),
            ];
            if let Some(ref src) = stats.wholesale_source {
                spans.push(Span::styled(
                    format!(" ({})", src),
                    Style::default().fg(t.dim),
                ));
            }
            f.render_widget(Paragraph::new(Line::from(spans)), chunks[4]);
        }
    }
}

// -- Tank monitoring --

fn draw_tank(f: &mut Frame, t: &Theme, d: &SiteData, area: Rect) {
    let block = Block::default()
        .title(" Tank Monitoring ")
        .title_style(Style::default().fg(t.title).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let tank = match d.tank.as_ref() {
        Some(tk) => tk,
        None => {
            let msg = Paragraph::new(" No sensor data available.")
                .style(Style::default().fg(t.dim));
            f.render_widget(msg, inner);
            return;
        }
    };

    let mut constraints = vec![Constraint::Length(1)]; // summary
    for _ in &tank.tanks {
        constraints.push(Constraint::Length(2));
    }
    constraints.push(Constraint::Length(1)); // footer
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let overall = tank.level_pct.unwrap_or(0.0);
    let overall_color = t.tier_color(gauge_tier(overall));
    let overall_text = match tank.level_pct {
        Some(p) => format!("{:.0}%", p),
        None => "--%".to_string(),
    };
    let days_text = match tank.est_days_to_empty {
        Some(days) => format!("{:.1}", days),
        None => "--".to_string(),
    };
    let summary = Paragraph::new(Line::from(vec![
        Span::styled(" Overall: ", Style::default().fg(t.dim)),
        Span::styled(
            overall_text,
            Style::default().fg(overall_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Days to Empty: ", Style::default().fg(t.dim)),
        Span::styled(days_text, Style::default().fg(t.fg)),
    ]));
    f.render_widget(summary, chunks[0]);

    for (i, level) in tank.tanks.iter().enumerate() {
        let color = t.tier_color(gauge_tier(level.level_pct));
        let label = format!(
            "{}  {:.0}%  {}",
            level.grade,
            level.level_pct,
            format_gallons(level.gallons, level.capacity)
        );
        let gauge = Gauge::default()
            .ratio((level.level_pct / 100.0).clamp(0.0, 1.0))
            .gauge_style(Style::default().fg(color).bg(t.highlight_bg))
            .label(Span::styled(label, Style::default().fg(t.fg)));
        f.render_widget(gauge, chunks[1 + i]);
    }

    let sensor = match tank.last_sensor_at.as_deref() {
        Some(ts) => format_wire_time(ts),
        None => "\u{2014}".to_string(),
    };
    let mut spans = vec![Span::styled(
        format!(" Last sensor: {}", sensor),
        Style::default().fg(t.dim),
    )];
    if let Some(ref notes) = tank.notes {
        spans.push(Span::styled(
            format!("  {}", notes),
            Style::default().fg(t.dim),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)),
        chunks[1 + tank.tanks.len()],
    );
}

// -- Service pricing --

fn draw_services(f: &mut Frame, t: &Theme, d: &SiteData, area: Rect) {
    let block = Block::default()
        .title(" Service Pricing ")
        .title_style(Style::default().fg(t.title).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let svc = d.services.as_ref();
    let mut lines = vec![
        service_line(t, "Labor/hr", svc.map(|s| s.labor_per_hour)),
        service_line(t, "Oil change", svc.map(|s| s.oil_change)),
        service_line(t, "Tires set", svc.map(|s| s.tires)),
    ];
    if let Some(rating) = svc.and_then(|s| s.rating) {
        lines.push(Line::from(Span::styled(
            format!(" Rating: {:.1}", rating),
            Style::default().fg(t.accent),
        )));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn service_line<'a>(t: &Theme, label: &'a str, value: Option<f64>) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!(" {}: ", label), Style::default().fg(t.dim)),
        Span::styled(format_price(value), Style::default().fg(t.fg)),
    ])
}

// -- Bottom bar --

fn draw_bottom_bar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let hints = if app.input_mode == InputMode::StrategyMenu {
        " j/k move | Enter apply | Esc close ".to_string()
    } else {
        format!(
            " Tab \u{21c6} | 1-{} site | r refresh | s sync | p strategy | q quit \u{2502} API: {}",
            app.sites.len(),
            app.client.base_url()
        )
    };
    let bar = Paragraph::new(hints).style(Style::default().fg(t.dim));
    f.render_widget(bar, area);
}

// -- Strategy dropdown popup --

fn draw_strategy_menu(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let current = app.active().data.lock().unwrap().display_strategy();

    let area = f.area();
    let box_w = 26_u16.min(area.width.saturating_sub(4));
    let box_h = (STRATEGIES.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(box_w)) / 2;
    let y = (area.height.saturating_sub(box_h)) / 2;
    let popup = Rect::new(x, y, box_w, box_h);

    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Pricing Strategy ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.accent));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let constraints: Vec<Constraint> =
        STRATEGIES.iter().map(|_| Constraint::Length(1)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, strategy) in STRATEGIES.iter().enumerate() {
        let is_sel = i == app.menu_selected;
        let is_current = current == Some(*strategy);
        let marker = if is_sel { "\u{25b8} " } else { "  " };

        let mut style = Style::default().fg(if is_current { t.accent } else { t.fg });
        if is_current {
            style = style.add_modifier(Modifier::BOLD);
        }

        let line = Line::from(vec![
            Span::styled(marker, Style::default().fg(t.fg)),
            Span::styled(strategy.label(), style),
        ]);
        let row_style = if is_sel {
            Style::default().bg(t.highlight_bg).fg(t.highlight_fg)
        } else {
            Style::default()
        };
        f.render_widget(Paragraph::new(line).style(row_style), rows[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SiteClient;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn top_bar_status_stays_right_aligned_despite_wide_glyphs() {
        let app = App::new(
            Config::default(),
            SiteClient::new("http://localhost:8787"),
            crate::theme::dark(),
        );
        app.active().data.lock().unwrap().loading = true;

        let width = 120;
        let backend = TestBackend::new(width, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let top: String = (0..width)
            .map(|x| buffer[(x, 0)].symbol())
            .collect();
        // The pump glyph and separators are wider than one byte; padding
        // must still land the status flush at the right edge.
        assert!(
            top.trim_end().ends_with("loading..."),
            "top bar was: {:?}",
            top
        );
    }
}
