use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use lunchr_core::SourceMenu;

use crate::app::App;
use crate::report::{price_label, stats_line};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let subtitle = app
        .daily
        .as_ref()
        .map_or_else(|| "no menus loaded yet".to_owned(), stats_line);
    let header = Paragraph::new(format!("lunchr – today's lunch menus · {subtitle}"))
        .block(Block::default().borders(Borders::ALL).title("Lunchr"));
    frame.render_widget(header, *header_area);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(*content_area);
    let [sources_area, menu_area] = content_chunks.as_ref() else {
        return;
    };
    draw_sources(frame, app, *sources_area);
    draw_menu(frame, app, *menu_area);

    // Status bar
    let nav_hint = "↑/↓ move · r refresh · q/Ctrl-C quit";
    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = app.error_message.as_ref().or(app.notice.as_ref()) {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading || app.notice.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn source_label(menu: &SourceMenu) -> (String, Color) {
    if menu.is_failed() {
        (format!("{} (error)", menu.title), Color::Red)
    } else if menu.is_empty() {
        (format!("{} (–)", menu.title), Color::DarkGray)
    } else {
        let count = menu.soups.len() + menu.lunches.len();
        (format!("{} ({count})", menu.title), Color::Reset)
    }
}

fn draw_sources(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = app
        .menus()
        .iter()
        .map(|menu| {
            let (label, color) = source_label(menu);
            ListItem::new(label).style(Style::default().fg(color))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Restaurants"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.menus().is_empty() {
        state.select(Some(app.list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_menu(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(menu) = app.selected() else {
        let text = if app.is_loading {
            "Collecting menus…"
        } else {
            "Nothing to show. Press r to fetch."
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Menu"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!(
        "{} · {} · {} ms",
        menu.title,
        menu.location,
        menu.elapsed().as_millis()
    );

    if let Some(err) = &menu.error {
        let paragraph = Paragraph::new(format!("{}\n\n{err}", menu.url))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    if menu.is_empty() {
        let paragraph = Paragraph::new(format!("No menu published today.\n\n{}", menu.url))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let soups = menu.soups.iter().map(|soup| {
        Row::new(vec![
            Cell::from(""),
            Cell::from(soup.name.clone()),
            Cell::from(price_label(soup.price)),
        ])
        .style(Style::default().fg(Color::Cyan))
    });
    let lunches = menu.lunches.iter().map(|lunch| {
        let name = match &lunch.ingredients {
            Some(ingredients) => Text::from(vec![
                Line::from(lunch.name.clone()),
                Line::from(ingredients.clone()).style(Style::default().fg(Color::DarkGray)),
            ]),
            None => Text::from(lunch.name.clone()),
        };
        let height = u16::try_from(name.lines.len()).unwrap_or(1);
        Row::new(vec![
            Cell::from(format!("{}.", lunch.num)),
            Cell::from(name),
            Cell::from(price_label(lunch.price)),
        ])
        .height(height)
    });

    let column_widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(8),
    ];

    let table = Table::new(soups.chain(lunches), column_widths)
        .header(
            Row::new(vec!["#", "Dish", "Price"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}
