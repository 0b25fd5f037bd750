use std::fmt::Write as _;

use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, TableState, Wrap,
};

use crate::api::models::Attribution;
use crate::error::FetchError;

use super::super::episode::{DEFAULT_MAX_PAST, DEFAULT_MAX_UPCOMING, extract_air_times, truncate};
use super::super::plan::{build_plan_request, effective_country};
use super::super::providers::flatten_providers;
use super::super::stage::StageState;
use super::{DetailView, FieldEditor, Pane, TuiState};

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED: Color = Color::Rgb(185, 195, 210);

pub(super) fn draw_tui(frame: &mut Frame, state: &mut TuiState) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(header(state), chunks[0]);

    let list_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(24),
            Constraint::Percentage(38),
            Constraint::Percentage(38),
        ])
        .split(chunks[1]);
    draw_genres(frame, state, list_chunks[0]);
    draw_titles(frame, state, list_chunks[1]);
    draw_services(frame, state, list_chunks[2]);

    let detail = Paragraph::new(detail_text(state))
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .wrap(Wrap { trim: false })
        .block(panel_block(format!("Detail: {}", state.detail.label()), false));
    frame.render_widget(detail, chunks[2]);

    let command_bar = Paragraph::new(detail_selector_line(state.detail))
        .alignment(Alignment::Center)
        .block(panel_block("Controls", false));
    frame.render_widget(command_bar, chunks[3]);

    let status_widget = Paragraph::new(state.status.clone())
        .style(status_style(&state.status))
        .block(panel_block("Status", false));
    frame.render_widget(status_widget, chunks[4]);

    if let Some(editor) = state.editor.as_ref() {
        draw_editor(frame, editor);
    }
}

fn header(state: &TuiState) -> Paragraph<'static> {
    let inputs = state.cascade.plan_inputs();
    let separator = || Span::styled("   ", Style::default());
    Paragraph::new(Line::from(vec![
        Span::styled(
            "STREAMPLAN",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(
            truncate(&state.api_base_url, 40),
            Style::default().fg(MUTED),
        ),
        separator(),
        Span::styled(
            format!("country {}", effective_country(&inputs.country)),
            Style::default().fg(Color::Yellow),
        ),
        separator(),
        Span::styled(
            format!("horizon {}", inputs.horizon_days.trim()),
            Style::default().fg(MUTED),
        ),
        separator(),
        Span::styled(
            format!("permanent {}", truncate(inputs.permanent_service_ids.trim(), 30)),
            Style::default().fg(MUTED),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Dashboard", false))
}

/// Text shown in place of a list while its stage has nothing to list.
fn stage_placeholder<T>(stage: &StageState<T>, idle_hint: &str) -> Option<String> {
    match stage {
        StageState::Idle => Some(idle_hint.to_string()),
        StageState::Loading => Some("Loading...".to_string()),
        StageState::Error(err) => Some(err.summary()),
        StageState::Success { .. } => None,
    }
}

fn list_title(pane: Pane, parent: Option<&str>, stage_label: &str) -> String {
    match parent {
        Some(parent) => format!("{}: {} [{stage_label}]", pane.label(), truncate(parent, 24)),
        None => format!("{} [{stage_label}]", pane.label()),
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_table(
    frame: &mut Frame,
    area: Rect,
    title: String,
    focused: bool,
    header: Vec<&'static str>,
    widths: Vec<Constraint>,
    rows: Vec<Row<'static>>,
    table_state: &mut TableState,
) {
    let table = Table::new(rows, widths)
        .header(
            Row::new(header).style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .block(panel_block(title, focused))
        .row_highlight_style(
            Style::default()
                .bg(ACCENT)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, area, table_state);
}

fn draw_placeholder(frame: &mut Frame, area: Rect, title: String, focused: bool, text: String) {
    let style = if title.ends_with("[error]") {
        status_style("ERROR:")
    } else {
        Style::default().fg(MUTED)
    };
    let widget = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(panel_block(title, focused));
    frame.render_widget(widget, area);
}

fn draw_genres(frame: &mut Frame, state: &mut TuiState, area: Rect) {
    let stage = state.cascade.genres();
    let title = list_title(Pane::Genres, None, stage.label());
    let focused = state.focus == Pane::Genres;
    if let Some(text) = stage_placeholder(stage, "Waiting to load genres.") {
        let text = if stage.error().is_some() {
            format!("{text}\n\nPress r to retry.")
        } else {
            text
        };
        draw_placeholder(frame, area, title, focused, text);
        return;
    }
    let rows: Vec<Row<'static>> = stage
        .success()
        .map(|envelope| {
            envelope
                .data
                .genres
                .iter()
                .map(|genre| Row::new(vec![Cell::from(genre.name.clone())]))
                .collect()
        })
        .unwrap_or_default();
    draw_table(
        frame,
        area,
        title,
        focused,
        vec!["Genre"],
        vec![Constraint::Percentage(100)],
        rows,
        &mut state.genre_table,
    );
}

fn draw_titles(frame: &mut Frame, state: &mut TuiState, area: Rect) {
    let stage = state.cascade.titles();
    let parent = state.cascade.selected_genre().map(|genre| genre.name.as_str());
    let title = list_title(Pane::Titles, parent, stage.label());
    let focused = state.focus == Pane::Titles;
    if let Some(text) = stage_placeholder(stage, "Select a genre.") {
        draw_placeholder(frame, area, title, focused, text);
        return;
    }
    let rows: Vec<Row<'static>> = stage
        .success()
        .map(|envelope| {
            envelope
                .data
                .results
                .iter()
                .map(|item| {
                    Row::new(vec![
                        Cell::from(item.display_name()),
                        Cell::from(item.first_air_date.clone().unwrap_or_else(|| "-".to_string())),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();
    draw_table(
        frame,
        area,
        title,
        focused,
        vec!["Title", "First Air"],
        vec![Constraint::Min(10), Constraint::Length(11)],
        rows,
        &mut state.title_table,
    );
}

fn draw_services(frame: &mut Frame, state: &mut TuiState, area: Rect) {
    let stage = state.cascade.availability();
    let parent = state.cascade.selected_title().map(|title| title.name.as_str());
    let title = list_title(Pane::Services, parent, stage.label());
    let focused = state.focus == Pane::Services;
    if let Some(text) = stage_placeholder(stage, "Select a title.") {
        draw_placeholder(frame, area, title, focused, text);
        return;
    }
    let rows: Vec<Row<'static>> = stage
        .success()
        .map(|response| {
            response
                .assessments
                .iter()
                .map(|assessment| {
                    Row::new(vec![
                        Cell::from(assessment.service_id.clone()),
                        Cell::from(assessment.provider_category.label()),
                        Cell::from(assessment.availability_now.label()),
                        Cell::from(assessment.confidence.label()),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();
    if rows.is_empty() {
        draw_placeholder(frame, area, title, focused, "No services found.".to_string());
        return;
    }
    draw_table(
        frame,
        area,
        title,
        focused,
        vec!["Service", "Category", "Now", "Conf."],
        vec![
            Constraint::Min(10),
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Length(6),
        ],
        rows,
        &mut state.service_table,
    );
}

fn push_error_body(out: &mut String, stage_err: &FetchError) {
    let _ = writeln!(out, "{}", stage_err.summary());
    if let Some(body) = stage_err.pretty_body() {
        let _ = writeln!(out, "\n{body}");
    }
}

fn push_attribution(out: &mut String, attribution: Option<&Attribution>) {
    if let Some(attribution) = attribution {
        let _ = write!(out, "\n{}", attribution.text);
        if let Some(url) = attribution.url.as_deref() {
            let _ = write!(out, " ({url})");
        }
        out.push('\n');
    }
}

pub(super) fn detail_text(state: &TuiState) -> String {
    match state.detail {
        DetailView::Episodes => episodes_text(state),
        DetailView::Providers => providers_text(state),
        DetailView::Plan => plan_text(state),
    }
}

fn episodes_text(state: &TuiState) -> String {
    let mut out = String::new();
    if let Some(service) = state.cascade.selected_service() {
        let _ = writeln!(
            out,
            "Service {} ({}, now {}, confidence {})\n",
            service.service_id,
            service.category.label(),
            service.availability_now.label(),
            service.confidence.label()
        );
    }

    match state.cascade.episodes() {
        StageState::Idle => out.push_str("Select a service to load episode air times."),
        StageState::Loading => out.push_str("Loading episodes..."),
        StageState::Error(err) => push_error_body(&mut out, err),
        StageState::Success { body, .. } => {
            let times = extract_air_times(
                body.data.episodes(),
                DEFAULT_MAX_UPCOMING,
                DEFAULT_MAX_PAST,
                Utc::now(),
            );
            if let Some(name) = body.data.name.as_deref() {
                let _ = writeln!(out, "{name}");
            }
            let _ = writeln!(out, "Next air: {}", times.next_label());
            let _ = writeln!(out, "Last air: {}", times.last_label());
            out.push_str("\nUpcoming\n");
            if times.upcoming.is_empty() {
                out.push_str("  (none)\n");
            }
            for item in &times.upcoming {
                let _ = writeln!(out, "  {}  {}", item.label, item.episode);
            }
            out.push_str("\nRecent\n");
            if times.past.is_empty() {
                out.push_str("  (none)\n");
            }
            for item in &times.past {
                let _ = writeln!(out, "  {}  {}", item.label, item.episode);
            }
            let _ = write!(out, "\nRetrieved {}", body.retrieved_at);
            push_attribution(&mut out, body.attribution.as_ref());
        }
    }
    out
}

fn providers_text(state: &TuiState) -> String {
    let mut out = String::new();
    match state.cascade.providers() {
        StageState::Idle => out.push_str("Select a title to load watch providers."),
        StageState::Loading => out.push_str("Loading providers..."),
        StageState::Error(err) => push_error_body(&mut out, err),
        StageState::Success { body, .. } => {
            let country = body
                .data
                .country
                .clone()
                .unwrap_or_else(|| effective_country(state.cascade.country()).to_uppercase());
            match body.data.result.as_ref() {
                None => {
                    let _ = writeln!(out, "No watch providers listed for {country}.");
                }
                Some(region) => {
                    let listed = flatten_providers(region);
                    let _ = writeln!(out, "{} providers in {country}\n", listed.len());
                    for item in &listed {
                        let _ = writeln!(
                            out,
                            "  {:<13} {}",
                            item.bucket.label(),
                            item.provider.display_name()
                        );
                    }
                    if let Some(link) = region.link.as_deref() {
                        let _ = writeln!(out, "\n{link}");
                    }
                }
            }
            let _ = write!(out, "\nRetrieved {}", body.retrieved_at);
            push_attribution(&mut out, body.attribution.as_ref());
        }
    }
    out
}

fn plan_text(state: &TuiState) -> String {
    let mut out = String::new();
    let assessments = state
        .cascade
        .availability()
        .success()
        .map(|response| response.assessments.as_slice())
        .unwrap_or_default();
    let preview = build_plan_request(&state.cascade.plan_inputs(), assessments);
    let permanent = if preview.permanent_service_ids.is_empty() {
        "(none)".to_string()
    } else {
        preview.permanent_service_ids.join(", ")
    };
    let _ = writeln!(
        out,
        "Country {}  Horizon {} days  Permanent {permanent}\n",
        preview.country, preview.horizon_days
    );

    match state.cascade.plan() {
        StageState::Idle => out.push_str("Press g to generate a plan from the loaded availability."),
        StageState::Loading => out.push_str("Generating plan..."),
        StageState::Error(err) => push_error_body(&mut out, err),
        StageState::Success { body, .. } => {
            let _ = writeln!(
                out,
                "Plan for {} over {} days (generated {})\n",
                body.country, body.horizon_days, body.generated_at
            );
            if body.events.is_empty() {
                out.push_str("No subscription changes.\n");
            }
            for event in &body.events {
                let _ = write!(
                    out,
                    "  {}  {:<11} {}",
                    event.effective_at,
                    event.action.label(),
                    event.service_id
                );
                if !event.reason_codes.is_empty() {
                    let _ = write!(out, "  [{}]", event.reason_codes.join(", "));
                }
                out.push('\n');
            }
            let questions = body.questions();
            if !questions.is_empty() {
                out.push_str("\nQuestions\n");
            }
            for question in questions {
                let marker = if question.required { "*" } else { " " };
                let _ = writeln!(out, "  {marker} {}", question.prompt);
            }
        }
    }
    out
}

fn draw_editor(frame: &mut Frame, editor: &FieldEditor) {
    let popup_text = format!(
        "{}\n\n{}_\n\n[Enter] Apply   [Esc] Cancel",
        editor.field.label(),
        editor.buffer
    );
    let popup_area = popup_rect_for_text(frame.area(), &popup_text);
    render_popup_shadow(frame, popup_area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(popup_text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(modal_block("Edit"));
    frame.render_widget(popup, popup_area);
}

fn panel_block(title: impl Into<String>, focused: bool) -> Block<'static> {
    let title: String = title.into();
    let border = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(125, 135, 150))
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(title)
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn pill_style(view: DetailView, current: DetailView) -> Style {
    if view == current {
        Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(Color::Rgb(72, 82, 96))
            .fg(Color::Rgb(230, 235, 242))
    }
}

fn detail_selector_line(current: DetailView) -> Line<'static> {
    let mut spans = Vec::new();
    for view in [DetailView::Episodes, DetailView::Providers, DetailView::Plan] {
        spans.push(Span::styled(format!(" {} ", view.label()), pill_style(view, current)));
        spans.push(Span::styled(" ", Style::default()));
    }
    spans.push(Span::styled(
        "  ←/→/Tab pane  ↑/↓ move  Enter select  d detail  g plan  c/h/p edit  r retry  q quit",
        Style::default().fg(MUTED),
    ));
    Line::from(spans)
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let min_width = 40.min(available_width);
    let max_width = 72.min(available_width);
    let width = max_line_width.saturating_add(12).clamp(min_width, max_width);

    let available_height = area.height.saturating_sub(2).max(1);
    let min_height = 8.min(available_height);
    let max_height = 14.min(available_height);
    let height = line_count.saturating_add(4).clamp(min_height, max_height);

    centered_fixed_rect(width, height, area)
}
