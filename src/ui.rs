use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Gauge, Paragraph, Row, Table, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    effects::{FlashKind, Sparkle},
    runtime::Cadence,
    scoring::{BonusTier, PointsTier, PrecisionZone},
    session::{EndReason, GameStatus},
};

const HORIZONTAL_MARGIN: u16 = 2;
const BUTTON_WIDTH: u16 = 26;
const BUTTON_HEIGHT: u16 = 7;
const RETRY_WIDTH: u16 = 20;
const RETRY_HEIGHT: u16 = 3;
const HINT_LINES: u16 = 4;

const ORANGE: Color = Color::Rgb(255, 165, 0);
const PERFECT_FLASH_BG: Color = Color::Rgb(70, 0, 0);
const PRECISION_FLASH_BG: Color = Color::Rgb(70, 35, 0);

/// Fractions of the countdown (remaining) marking 80/98/99% elapsed.
const GAUGE_MARKERS: [f64; 3] = [0.20, 0.02, 0.01];

struct PlayLayout {
    header: Rect,
    timer: Rect,
    gauge: Rect,
    button: Rect,
    hint: Rect,
    footer: Rect,
}

struct ResultsLayout {
    header: Rect,
    headline: Rect,
    subtitle: Rect,
    score: Rect,
    summary: Rect,
    tiers: Rect,
    history: Rect,
    button: Rect,
    footer: Rect,
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn play_layout(area: Rect) -> PlayLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3),             // header
            Constraint::Fill(1),               // padding
            Constraint::Length(1),             // timer
            Constraint::Length(1),             // gauge
            Constraint::Length(1),             // padding
            Constraint::Length(BUTTON_HEIGHT), // button
            Constraint::Length(1),             // padding
            Constraint::Length(HINT_LINES),    // hint
            Constraint::Fill(1),               // padding
            Constraint::Length(1),             // footer
        ])
        .split(area);

    PlayLayout {
        header: chunks[0],
        timer: chunks[2],
        gauge: centered(chunks[3], 40, 1),
        button: centered(chunks[5], BUTTON_WIDTH, BUTTON_HEIGHT),
        hint: chunks[7],
        footer: chunks[9],
    }
}

fn results_layout(area: Rect) -> ResultsLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3),            // header
            Constraint::Length(1),            // headline
            Constraint::Length(1),            // subtitle
            Constraint::Length(1),            // score
            Constraint::Length(1),            // summary
            Constraint::Length(1),            // tier counts
            Constraint::Min(3),               // history
            Constraint::Length(RETRY_HEIGHT), // retry button
            Constraint::Length(1),            // footer
        ])
        .split(area);

    ResultsLayout {
        header: chunks[0],
        headline: chunks[1],
        subtitle: chunks[2],
        score: chunks[3],
        summary: chunks[4],
        tiers: chunks[5],
        history: chunks[6],
        button: centered(chunks[7], RETRY_WIDTH, RETRY_HEIGHT),
        footer: chunks[8],
    }
}

/// Clickable button for the screen shown in `status`.
pub fn button_area(area: Rect, status: GameStatus) -> Rect {
    match status {
        GameStatus::Lost => results_layout(area).button,
        GameStatus::Idle | GameStatus::Playing => play_layout(area).button,
    }
}

pub fn zone_color(zone: PrecisionZone) -> Color {
    match zone {
        PrecisionZone::Safe => Color::Green,
        PrecisionZone::Scoring => Color::Cyan,
        PrecisionZone::Critical => Color::Red,
    }
}

pub fn points_style(tier: PointsTier) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match tier {
        PointsTier::Legendary => bold.fg(Color::Red),
        PointsTier::Great => bold.fg(ORANGE),
        PointsTier::Good => bold.fg(Color::Cyan),
        PointsTier::Plain => bold.fg(Color::DarkGray),
    }
}

fn bonus_style(tier: BonusTier) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match tier {
        BonusTier::Perfect => bold.fg(Color::Red),
        BonusTier::Precision => bold.fg(ORANGE),
        BonusTier::None => bold.fg(Color::White),
    }
}

/// Write `text` at (x, y), clipped to `area`.
fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if x < area.x || y < area.y || x >= area.right() || y >= area.bottom() {
        return;
    }
    buf.set_stringn(x, y, text, (area.right() - x) as usize, style);
}

impl<C: Cadence> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        match self.effects.flash(self.now) {
            Some(FlashKind::Perfect) => buf.set_style(area, Style::default().bg(PERFECT_FLASH_BG)),
            Some(FlashKind::Precision) => {
                buf.set_style(area, Style::default().bg(PRECISION_FLASH_BG))
            }
            None => {}
        }

        match session.status() {
            GameStatus::Lost => render_results(self, area, buf),
            GameStatus::Idle | GameStatus::Playing => render_play(self, area, buf),
        }

        render_sparkles(&self.effects.sparkles, area, buf);
        for popup in &self.effects.popups {
            let label = popup.label();
            let row = popup.row(self.now);
            let x = popup.x.saturating_sub(label.width() as u16 / 2);
            put(buf, area, x, row, &label, bonus_style(popup.tier));

            if popup.tier != BonusTier::None {
                let tag = popup.tier.to_string();
                let x = popup.x.saturating_sub(tag.width() as u16 / 2);
                if let Some(above) = row.checked_sub(1) {
                    put(buf, area, x, above, &tag, bonus_style(popup.tier));
                }
            }
        }
    }
}

fn render_header<C: Cadence>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let label_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().add_modifier(Modifier::BOLD);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled("SCORE", label_style)),
        Line::from(Span::styled(session.score().to_string(), value_style)),
    ])
    .alignment(Alignment::Left)
    .render(columns[0], buf);

    if session.status() == GameStatus::Playing {
        Paragraph::new(vec![
            Line::from(Span::styled("ATTEMPTS", label_style.fg(Color::Green))),
            Line::from(vec![
                Span::styled(session.attempts().to_string(), value_style),
                Span::styled(
                    format!(" / {}", session.max_attempts()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        ])
        .alignment(Alignment::Center)
        .render(columns[1], buf);
    }

    Paragraph::new(vec![
        Line::from(Span::styled("BEST", label_style)),
        Line::from(Span::styled(
            session.high_score().to_string(),
            value_style.fg(Color::Green),
        )),
    ])
    .alignment(Alignment::Right)
    .render(columns[2], buf);
}

fn render_play<C: Cadence>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let layout = play_layout(area);
    let zone = session.zone();
    let color = zone_color(zone);
    let pressed = app.effects.is_pressed(app.now);

    render_header(app, layout.header, buf);

    let mut timer_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if pressed {
        timer_style = timer_style.add_modifier(Modifier::REVERSED);
    }
    Paragraph::new(Line::from(vec![
        Span::styled(format!("{:.1}", session.time_left()), timer_style),
        Span::styled("s", Style::default().fg(color).add_modifier(Modifier::DIM)),
    ]))
    .alignment(Alignment::Center)
    .render(layout.timer, buf);

    Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(session.countdown().remaining_ratio().clamp(0.0, 1.0))
        .label("")
        .use_unicode(true)
        .render(layout.gauge, buf);
    for fraction in GAUGE_MARKERS {
        let x = layout.gauge.x + (layout.gauge.width as f64 * fraction) as u16;
        put(
            buf,
            layout.gauge,
            x,
            layout.gauge.y,
            "┆",
            Style::default().fg(Color::White),
        );
    }

    render_button(app, layout.button, buf);

    if session.status() == GameStatus::Idle {
        let initial = session.initial_time();
        let bright = Style::default().add_modifier(Modifier::BOLD);
        let hint = vec![
            Line::from(vec![
                Span::raw("Press "),
                Span::styled("SPACE", bright),
                Span::raw(" or click "),
                Span::styled("START", bright),
                Span::raw(" to begin."),
            ]),
            Line::from(vec![
                Span::styled(format!("{} attempts", session.max_attempts()), bright),
                Span::raw(" to build the highest score."),
            ]),
            Line::from(vec![
                Span::raw("Bonus "),
                Span::styled("+50", bright.fg(ORANGE)),
                Span::raw(" at "),
                Span::styled(format!("98% ({:.1}s)", initial * 0.02), bright.fg(ORANGE)),
            ]),
            Line::from(vec![
                Span::raw("Bonus "),
                Span::styled("+100", bright.fg(Color::Red)),
                Span::raw(" at "),
                Span::styled(format!("99% ({:.1}s)", initial * 0.01), bright.fg(Color::Red)),
                Span::raw("!"),
            ]),
        ];
        Paragraph::new(hint)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(layout.hint, buf);
    }

    Paragraph::new(Span::styled(
        "(space) press / (r)eset / (esc)ape",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(layout.footer, buf);
}

fn render_button<C: Cadence>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let pressed = app.effects.is_pressed(app.now);

    let style = match (session.status(), session.zone()) {
        (GameStatus::Idle, _) => Style::default().fg(Color::White).bg(Color::Green),
        _ if pressed => Style::default().fg(Color::White).bg(Color::Cyan),
        (_, PrecisionZone::Critical) => Style::default().fg(Color::White).bg(Color::Red),
        (_, PrecisionZone::Scoring) => Style::default().fg(Color::White).bg(Color::Cyan),
        (_, PrecisionZone::Safe) => Style::default().fg(Color::Black).bg(Color::White),
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let lines = if session.status() == GameStatus::Idle {
        vec![
            Line::default(),
            Line::from(Span::styled("▶", bold)),
            Line::from(Span::styled("START", bold)),
        ]
    } else {
        let potential = session.potential();
        let mut potential_style = bold;
        if potential.is_bonus99 {
            potential_style = potential_style.fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK);
        } else if potential.points == 0 {
            potential_style = potential_style.add_modifier(Modifier::DIM);
        }
        vec![
            Line::from(Span::styled("RESET", bold.add_modifier(Modifier::ITALIC))),
            Line::from(Span::styled(
                "potential",
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(Span::styled(format!("+{}", potential.points), potential_style)),
        ]
    };

    let border_type = if pressed {
        BorderType::Double
    } else {
        BorderType::Thick
    };
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(border_type),
        )
        .style(style)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_results<C: Cadence>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let layout = results_layout(area);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    render_header(app, layout.header, buf);

    let (headline, subtitle, color) = match session.end_reason() {
        Some(EndReason::Timeout) => ("TIME'S UP", "out of time", Color::Red),
        Some(EndReason::Completed) | None => ("FINAL SCORE", "session complete", Color::Green),
    };
    Paragraph::new(Span::styled(headline, bold.fg(color)))
        .alignment(Alignment::Center)
        .render(layout.headline, buf);
    Paragraph::new(Span::styled(
        subtitle.to_uppercase(),
        Style::default().fg(color).add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(layout.subtitle, buf);
    Paragraph::new(Line::from(vec![
        Span::styled(session.score().to_string(), bold),
        Span::styled(" points", Style::default().fg(Color::Gray)),
    ]))
    .alignment(Alignment::Center)
    .render(layout.score, buf);

    let summary = session.history().summary();
    let summary_text = match summary.closest_call {
        Some(closest) => format!(
            "best +{}   avg {:.1}   closest {:.1}s   scoring {}/{}",
            summary.best_points,
            summary.average_points,
            closest,
            summary.scoring_attempts,
            summary.attempts
        ),
        None => "no attempts recorded".to_string(),
    };
    Paragraph::new(Span::styled(
        summary_text,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(layout.summary, buf);

    let mut tier_spans = Vec::new();
    for (tier, count) in session.history().tier_counts() {
        if !tier_spans.is_empty() {
            tier_spans.push(Span::raw("   "));
        }
        tier_spans.push(Span::styled(format!("{tier} ×{count}"), points_style(tier)));
    }
    Paragraph::new(Line::from(tier_spans))
        .alignment(Alignment::Center)
        .render(layout.tiers, buf);

    let rows: Vec<Row> = session
        .history()
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            Row::new(vec![
                Cell::from(format!("#{}", idx + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(format!("{:.1}s left", record.time_remaining)),
                Cell::from(format!("+{}", record.points)).style(points_style(record.tier())),
            ])
        })
        .collect();

    Table::new(
        rows,
        &[
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from("#"),
            Cell::from("TIME"),
            Cell::from("POINTS"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("History of {} attempts", session.history().len())),
    )
    .render(layout.history, buf);

    Paragraph::new(Span::styled("↻ RETRY", bold.fg(Color::Black)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .style(Style::default().bg(Color::White).fg(Color::Black))
        .alignment(Alignment::Center)
        .render(layout.button, buf);

    Paragraph::new(Span::styled(
        "(space) retry / (esc)ape",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(layout.footer, buf);
}

/// Render sparkles on top of whatever screen is showing
fn render_sparkles(sparkles: &[Sparkle], area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Red,
        Color::LightYellow,
        Color::Magenta,
        Color::LightRed,
        Color::White,
    ];

    for sparkle in sparkles {
        if sparkle.x < 0.0 || sparkle.y < 0.0 {
            continue;
        }
        let x = sparkle.x as u16;
        let y = sparkle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[sparkle.color_index % colors.len()];
        let alpha = sparkle.alpha();
        let style = if alpha > 0.6 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if alpha > 0.25 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&sparkle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
