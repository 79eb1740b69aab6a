use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyModifiers, MouseEventKind};
use edfs_tree::{Client, Element, Tree, TreeState};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Scrollbar, ScrollbarOrientation};
use ratatui::{Frame, Terminal};

/// Fetch the file tree and browse it in the terminal
#[derive(Debug, Clone, Parser)]
pub struct BrowseCommand {
    /// Start with every directory opened
    #[arg(long)]
    pub expand: bool,
}

impl BrowseCommand {
    pub async fn run(self, client: Client) -> Result<()> {
        let mut container = Element::container("tree");
        client
            .fetch_tree(&mut container)
            .await
            .with_context(|| format!("Failed to load the file tree from {}", client.config().server))?;

        let mut app = App::new(container, client.config().server.to_string());
        if self.expand {
            app.state.open_all(&app.container);
        }
        app.state.select_first(&app.container);

        // Terminal initialization
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableMouseCapture
        )?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let res = run_app(&mut terminal, &mut app);

        // restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res.context("Terminal error")
    }
}

struct App {
    container: Element,
    state: TreeState,
    title: String,
}

impl App {
    fn new(container: Element, server: String) -> Self {
        Self {
            container,
            state: TreeState::default(),
            title: format!("Files on {server}"),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let selected = self
            .state
            .selected_label(&self.container)
            .unwrap_or_default()
            .to_owned();
        let widget = Tree::new(&self.container)
            .block(
                Block::bordered()
                    .title(self.title.as_str())
                    .title_bottom(selected),
            )
            .experimental_scrollbar(Some(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .track_symbol(None)
                    .end_symbol(None),
            ))
            .highlight_style(
                Style::new()
                    .fg(Color::Black)
                    .bg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");
        frame.render_stateful_widget(widget, area, &mut self.state);
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> std::io::Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        let container = &app.container;
        match crossterm::event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('\n' | ' ') | KeyCode::Enter => app.state.toggle_selected(),
                KeyCode::Char('e') => app.state.open_all(container),
                KeyCode::Char('c') => app.state.close_all(),
                KeyCode::Left => app.state.key_left(),
                KeyCode::Right => app.state.key_right(),
                KeyCode::Down => app.state.key_down(container),
                KeyCode::Up => app.state.key_up(container),
                KeyCode::Esc => app.state.select(Vec::new()),
                KeyCode::Home => app.state.select_first(container),
                KeyCode::End => app.state.select_last(container),
                KeyCode::PageDown => app.state.scroll_down(3),
                KeyCode::PageUp => app.state.scroll_up(3),
                _ => false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => app.state.scroll_down(1),
                MouseEventKind::ScrollUp => app.state.scroll_up(1),
                _ => false,
            },
            _ => false,
        };
    }
}
