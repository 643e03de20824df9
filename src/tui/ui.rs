use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

use crate::output::{format_score, status_message, truncate_name, Balance, UNNAMED};
use crate::rating::ItemSet;
use crate::tui::app::{App, InputMode};
use crate::tui::theme::ThemeColors;

const BAR_WIDTH: usize = 10;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 7 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Set tabs
        Constraint::Fill(1),   // Wine table
        Constraint::Length(1), // Total and status
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    render_table(frame, chunks[2], app);
    render_summary(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    match app.input_mode {
        InputMode::Help => render_help_popup(frame, &app.colors),
        InputMode::CopyFrom => render_copy_popup(frame, app),
        InputMode::ConfirmReset => render_reset_popup(frame, &app.colors),
        InputMode::Normal | InputMode::EditName { .. } => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let mut spans = vec![Span::styled(
        "Wine Rater",
        Style::default().fg(colors.title_color).bold(),
    )];

    if let Some(set) = app.current() {
        let counts = format!(
            "{}/{}本 (最小{} 最大{})",
            set.active_count(),
            set.len(),
            set.min_count(),
            set.max_count()
        );
        let used = "Wine Rater".len() + counts.chars().count() + 2;
        let padding = (area.width as usize).saturating_sub(used);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(counts, Style::default().fg(colors.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<String> = app
        .session
        .collection
        .iter()
        .enumerate()
        .map(|(i, set)| {
            let marker = if set.is_balanced() { "" } else { "*" };
            format!("{} {}{}", i + 1, app.session.titles.get(set.set_id()), marker)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_set)
        .style(app.colors.tab_inactive_style)
        .highlight_style(app.colors.tab_active_style)
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = &app.colors;
    let Some(set) = app.session.collection.by_index(app.current_set) else {
        let empty_msg = Paragraph::new("セットがありません").alignment(Alignment::Center);
        frame.render_widget(empty_msg, area);
        return;
    };

    let editing = match app.input_mode {
        InputMode::EditName { item } => Some(item),
        _ => None,
    };

    // Index(4) + score and bar(17) + spacing
    let name_width = (area.width as usize).saturating_sub(4 + 17 + 3).max(8);

    let rows: Vec<Row> = set
        .items()
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let pending = app.is_pending_removal(set.set_id(), item.id);

            let mut score_spans = vec![Span::raw(format!("{:>6} ", format_score(item.score)))];
            score_spans.extend(score_bar(item.score, set.target_sum(), BAR_WIDTH, colors).spans);

            let name_cell = if editing == Some(item.id) {
                Cell::from(Line::from(vec![
                    Span::styled(app.name_input.clone(), colors.editing),
                    Span::styled("▏", colors.editing),
                ]))
            } else if item.is_active() {
                Cell::from(truncate_name(&item.name, name_width))
            } else {
                Cell::from(Span::styled(UNNAMED, Style::default().fg(colors.unnamed)))
            };

            let row_style = if pending {
                Style::default()
                    .fg(colors.pending_removal)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(colors.index_color)),
                Cell::from(Line::from(score_spans)),
                name_cell,
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Index: "20."
        Constraint::Length(17), // Score + bar: " 3.25 ███░░░░░░░"
        Constraint::Fill(1),    // Name
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "点数", "ワイン名"])
                .style(colors.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_summary(frame: &mut Frame, area: Rect, app: &App) {
    let Some(set) = app.current() else {
        return;
    };
    frame.render_widget(Paragraph::new(summary_line(set, &app.colors)), area);
}

fn summary_line(set: &ItemSet, colors: &ThemeColors) -> Line<'static> {
    let balance_color = colors.balance_color(Balance::of(set).is_exact());
    let (badge, badge_style) = if set.is_manual() {
        (" 手動 ", colors.manual_badge)
    } else {
        (" 自動 ", colors.auto_badge)
    };

    Line::from(vec![
        Span::styled(badge, badge_style),
        Span::raw(" 合計 "),
        Span::styled(format_score(set.total()), Style::default().fg(balance_color).bold()),
        Span::raw("  "),
        Span::styled(status_message(set), Style::default().fg(balance_color)),
    ])
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let text = if let Some(flash) = &app.flash {
        let color = if flash.is_error {
            colors.flash_error
        } else {
            colors.flash_success
        };
        Line::from(Span::styled(flash.message.clone(), Style::default().fg(color)))
    } else {
        let hints: &[(&str, &str)] = match app.input_mode {
            InputMode::EditName { .. } => &[("Enter", ":次へ "), ("Esc", ":完了")],
            _ => &[
                ("j/k", ":移動 "),
                ("Tab", ":セット "),
                ("e", ":名前 "),
                ("+/-", ":点数 "),
                ("a/d", ":追加/削除 "),
                ("D", ":均等 "),
                ("x", ":CSV "),
                ("y", ":コピー "),
                ("?", ":ヘルプ "),
                ("q", ":終了"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(colors.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area,
    );
}

/// Bar showing a score relative to the set's target
fn score_bar(score: f64, target: f64, width: usize, colors: &ThemeColors) -> Line<'static> {
    let ratio = if target > 0.0 {
        (score / target).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(colors.bar_filled),
        ));
    }
    if empty > 0 {
        spans.push(Span::styled(
            "░".repeat(empty),
            Style::default().fg(colors.bar_empty),
        ));
    }
    Line::from(spans)
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn popup_block<'a>(title: &'a str, colors: &ThemeColors) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(title, colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
}

fn key_line(key: &'static str, description: &'static str, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", key), colors.popup_key),
        Span::raw(description),
    ])
}

fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 22, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" キー操作 ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let help_lines = vec![
        key_line("j / Down", "下へ移動", colors),
        key_line("k / Up", "上へ移動", colors),
        key_line("Tab / S-Tab", "次/前のセット", colors),
        key_line("1-9", "セットを選択", colors),
        key_line("Enter / e", "ワイン名を編集", colors),
        key_line("+ / -", "点数を増減 (手動モード)", colors),
        key_line("a", "ワインを追加", colors),
        key_line("d", "ワインを削除", colors),
        key_line("D", "均等に配分 (自動モード)", colors),
        key_line("c", "他のセットから名前をコピー", colors),
        key_line("x", "CSVファイルに保存", colors),
        key_line("y", "TSVをクリップボードにコピー", colors),
        key_line("R", "すべてリセット", colors),
        key_line("?", "ヘルプを表示/非表示", colors),
        key_line("q / Ctrl-c", "終了", colors),
        Line::from(""),
        Line::from(Span::styled(
            "貼り付けると1行ずつ名前を入力します",
            Style::default().fg(colors.muted),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "いずれかのキーで閉じる",
            Style::default().fg(colors.muted),
        )),
    ];

    frame.render_widget(Paragraph::new(help_lines), inner);
}

fn render_copy_popup(frame: &mut Frame, app: &App) {
    let colors = &app.colors;
    let sources: Vec<Line> = app
        .session
        .collection
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != app.current_set)
        .map(|(i, set)| {
            Line::from(vec![
                Span::styled(format!("{:<4}", i + 1), colors.popup_key),
                Span::raw(app.session.titles.get(set.set_id()).to_string()),
            ])
        })
        .collect();

    let height = sources.len() as u16 + 4;
    let popup_area = centered_rect_fixed(40, height, frame.area());
    frame.render_widget(Clear, popup_area);

    let title = format!(" {}にコピー ", app.current_title());
    let block = popup_block(&title, colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = sources;
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "番号: コピー元を選択 | Esc: キャンセル",
        Style::default().fg(colors.muted),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_reset_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(44, 5, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" リセット ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = vec![
        Line::from("すべてのデータをリセットしますか？"),
        Line::from(vec![
            Span::styled("y", colors.popup_key),
            Span::raw(": リセット  "),
            Span::styled("n / Esc", colors.popup_key),
            Span::raw(": キャンセル"),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
