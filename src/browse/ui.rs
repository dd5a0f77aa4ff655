use std::io;
use std::panic;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use super::chart::{self, Viewport};
use super::input::handle_key;
use super::Navigator;
use crate::util::format_bytes;

const BAR_SYMBOL: &str = "█";

const KEYS: &[(&str, &str)] = &[
    ("↑↓/jk", "Select"),
    ("Enter/l", "Open"),
    ("Bksp", "Up"),
    ("g", "Top"),
    ("←→/[]", "History"),
    ("u", "Unit"),
    ("q", "Quit"),
];

struct Areas {
    header: Rect,
    list: Rect,
    chart: Rect,
    status: Rect,
}

/// Header line, listing on top, history chart below, key line at the bottom.
fn areas(size: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    Areas {
        header: rows[0],
        list: rows[1],
        chart: rows[2],
        status: rows[3],
    }
}

/// Drawing area inside the chart border.
fn chart_inner(chart: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(chart)
}

/// Takes over the terminal until the navigator quits.
pub fn run(mut navigator: Navigator) -> io::Result<()> {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, &mut navigator);
    restore_terminal()?;
    result
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    navigator: &mut Navigator,
) -> io::Result<()> {
    while !navigator.should_quit() {
        let size = terminal.size()?;
        let layout = areas(Rect::new(0, 0, size.width, size.height));
        let inner = chart_inner(layout.chart);
        navigator.set_viewport(usize::from(layout.list.height), chart::capacity(inner.width));
        navigator.refresh();

        terminal.draw(|f| draw(f, navigator))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                navigator.apply(handle_key(key));
            }
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, navigator: &mut Navigator) {
    let layout = areas(f.area());

    let header = Line::from(vec![
        Span::raw("Directory listing for: "),
        Span::styled(
            navigator.current().display().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(header), layout.header);

    draw_list(f, layout.list, navigator);
    draw_chart(f, layout.chart, navigator);
    draw_status(f, layout.status);
}

fn draw_list(f: &mut Frame, area: Rect, navigator: &Navigator) {
    let name_width = usize::from(area.width).saturating_sub(12);
    let lines: Vec<Line> = navigator
        .visible_entries()
        .map(|(idx, entry)| {
            let size = if entry.is_parent() {
                String::new()
            } else {
                format_bytes(entry.size)
            };
            let text = format!(
                "{:<width$} {:>10}",
                crate::util::truncate(&entry.name, name_width),
                size,
                width = name_width
            );
            if idx == navigator.selected() {
                Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Line::raw(text)
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

fn draw_chart(f: &mut Frame, area: Rect, navigator: &mut Navigator) {
    let inner = chart_inner(area);
    let viewport = Viewport {
        width: inner.width,
        height: inner.height,
    };
    let layout = navigator.chart(viewport);

    let name = navigator
        .selected_entry()
        .map(|e| e.name.clone())
        .unwrap_or_default();
    let title = match &layout.label {
        Some(label) => format!(" {name}: {label} "),
        None => format!(" {name}: no history "),
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), area);

    paint_bars(f.buffer_mut(), inner, &layout.bars);
}

fn paint_bars(buf: &mut Buffer, inner: Rect, bars: &[chart::Bar]) {
    for bar in bars {
        let style = if bar.selected {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default()
        };
        // bars grow upward from the bottom edge
        for dy in 0..bar.height {
            let y = inner.y + inner.height - 1 - dy;
            for dx in 0..bar.width {
                let x = inner.x + bar.x + dx;
                if x >= inner.right() {
                    break;
                }
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(BAR_SYMBOL).set_style(style);
                }
            }
        }
    }
}

fn draw_status(f: &mut Frame, area: Rect) {
    let mut spans = Vec::with_capacity(KEYS.len() * 2);
    for (key, desc) in KEYS {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::raw(format!(" {desc} ")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
