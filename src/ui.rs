use crate::{
    app::{AppSnapshot, NotificationKind, format_currency, format_signed_currency},
    dice::{Die, Side, TAI_TOTALS},
    round::Phase,
};
use color_eyre::eyre::{Result, eyre};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{prelude::*, widgets::*};
use std::io::stdout;
use unicode_width::UnicodeWidthStr;

pub type InputEventReceiver = EventStream;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    /// Asks to open the bet dialog; the app validates before it opens.
    OpenBet(Side),
    ConfirmBet { side: Side, amount: u64 },
    TopUp,
    ToggleSound,
    VoidRound,
    Rules,
    Redraw,
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    BetModal(BetState),
    QuitModal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct BetState {
    side: Side,
    amount: u64,
    /// Index into the quick amounts.
    chip: usize,
}

impl BetState {
    fn new(side: Side) -> Self {
        BetState {
            side,
            amount: 0,
            chip: 0,
        }
    }

    fn can_confirm(&self, balance: u64) -> bool {
        self.amount > 0 && self.amount <= balance
    }
}

/// Adds `chip` to `amount`, settling on the whole balance when it would
/// overshoot.
fn quick_add(amount: u64, chip: u64, balance: u64) -> u64 {
    amount.saturating_add(chip).min(balance)
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn input_event_stream() -> InputEventReceiver {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    match events.next().await {
        Some(event) => Ok(event?),
        None => Err(eyre!("terminal input stream closed")),
    }
}

pub fn open_bet_modal(state: &mut UiState, side: Side) {
    state.mode = Mode::BetModal(BetState::new(side));
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Maps a terminal event to a user intent, updating modal state on the way.
/// `None` means the event is ignored.
pub fn interpret_event(
    state: &mut UiState,
    event: Event,
    snap: &AppSnapshot,
) -> Option<UserEvent> {
    let k = match event {
        Event::Key(k) if k.kind == KeyEventKind::Press => k,
        Event::Resize(..) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    if is_ctrl_c(&k) {
        return Some(UserEvent::Quit);
    }
    let balance = snap.game.balance;
    match &mut state.mode {
        Mode::BetModal(bs) => {
            return match k.code {
                KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Enter => {
                    if !bs.can_confirm(balance) {
                        return None;
                    }
                    let ev = UserEvent::ConfirmBet {
                        side: bs.side,
                        amount: bs.amount,
                    };
                    state.mode = Mode::Normal;
                    Some(ev)
                }
                KeyCode::Left => {
                    bs.chip = bs.chip.saturating_sub(1);
                    Some(UserEvent::Redraw)
                }
                KeyCode::Right => {
                    if bs.chip + 1 < snap.quick_amounts.len() {
                        bs.chip += 1;
                    }
                    Some(UserEvent::Redraw)
                }
                KeyCode::Up | KeyCode::Char(' ') | KeyCode::Char('+') => {
                    let chip = snap.quick_amounts.get(bs.chip).copied()?;
                    bs.amount = quick_add(bs.amount, chip, balance);
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char('a') => {
                    bs.amount = balance;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char('c') | KeyCode::Delete => {
                    bs.amount = 0;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Backspace => {
                    bs.amount /= 10;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char(c) => {
                    let d = c.to_digit(10)?;
                    bs.amount = bs.amount.saturating_mul(10).saturating_add(d as u64);
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::QuitModal => {
            return match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::Normal => {}
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('t') | KeyCode::Left => Some(UserEvent::OpenBet(Side::Tai)),
        KeyCode::Char('x') | KeyCode::Right => Some(UserEvent::OpenBet(Side::Xiu)),
        KeyCode::Char('+') | KeyCode::Char('n') => Some(UserEvent::TopUp),
        KeyCode::Char('m') => Some(UserEvent::ToggleSound),
        KeyCode::Char('r') | KeyCode::F(5) => Some(UserEvent::VoidRound),
        KeyCode::Char('i') | KeyCode::Char('?') => Some(UserEvent::Rules),
        _ => None,
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL)
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // balance bar
            Constraint::Length(11), // TÀI | plate | XỈU
            Constraint::Length(3),  // history board
            Constraint::Length(4),  // status + notification
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_top(f, chunks[0], snap);
    draw_table(f, chunks[1], snap);
    draw_history(f, chunks[2], snap);
    draw_status(f, chunks[3], snap);
    draw_help(f, chunks[4]);
    draw_modals(f, state, snap);
}

fn draw_top(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let sound = if snap.sound { "♪ on" } else { "♪ off" };
    let line = Line::from(vec![
        Span::styled(
            format!("{} VND", format_currency(snap.game.balance)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  | Ván #{} | {}", snap.game.round_id, sound)),
    ]);
    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Tài Xỉu"));
    f.render_widget(widget, area);
}

fn side_color(side: Side) -> Color {
    match side {
        Side::Tai => Color::Red,
        Side::Xiu => Color::Blue,
    }
}

fn draw_table(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);
    draw_side(f, cols[0], snap, Side::Tai);
    draw_plate(f, cols[1], snap);
    draw_side(f, cols[2], snap, Side::Xiu);
}

/// Once the result is on screen, the side the player did not back fades out.
fn side_dimmed(snap: &AppSnapshot, side: Side) -> bool {
    snap.game.phase == Phase::Result && snap.game.held_bet.is_some_and(|bet| bet.side != side)
}

fn draw_side(f: &mut Frame, area: Rect, snap: &AppSnapshot, side: Side) {
    let totals = snap.game.crowd.side(side);
    let mine = snap
        .game
        .held_bet
        .filter(|bet| bet.side == side)
        .map_or(0, |bet| bet.amount);
    let lines = vec![
        Line::styled(
            side.label(),
            Style::default()
                .fg(side_color(side))
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(format!("{} người", format_currency(totals.players))),
        Line::from(format_currency(totals.amount)),
        Line::from(""),
        Line::styled(
            format!("Cược: {}", format_currency(mine)),
            Style::default().fg(Color::Yellow),
        ),
    ];
    let border = if side_dimmed(snap, side) {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(side_color(side))
    };
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!("[{}]", side_key(side))),
    );
    f.render_widget(widget, area);
}

fn side_key(side: Side) -> char {
    match side {
        Side::Tai => 't',
        Side::Xiu => 'x',
    }
}

fn die_glyph(die: Die) -> char {
    ['⚀', '⚁', '⚂', '⚃', '⚄', '⚅'][usize::from(die.value() - 1)]
}

fn draw_plate(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let game = &snap.game;
    let timer = match game.time_left {
        Some(secs) => format!("{secs:02}"),
        None => String::from("--"),
    };
    let phase_style = match game.phase {
        Phase::Betting => Style::default().fg(Color::Green),
        Phase::Lock => Style::default().fg(Color::Yellow),
        Phase::Rolling => Style::default().fg(Color::Magenta),
        Phase::Result => Style::default().fg(Color::Cyan),
    };
    let mut lines = vec![
        Line::styled(game.phase.as_str(), phase_style.add_modifier(Modifier::BOLD)),
        Line::styled(timer, Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
    ];
    let dice = if game.phase == Phase::Rolling {
        String::from("? ? ?")
    } else {
        game.dice
            .faces()
            .iter()
            .map(|d| format!("{} {}", die_glyph(*d), d.value()))
            .collect::<Vec<_>>()
            .join("   ")
    };
    lines.push(Line::from(dice));
    if game.phase == Phase::Result {
        if let (Some(total), Some(label)) = (game.last_total, game.last_outcome) {
            let triple = if game.last_triple { " · bão" } else { "" };
            lines.push(Line::from(""));
            lines.push(Line::styled(
                format!("{total} {label}{triple}"),
                Style::default()
                    .fg(side_color(label))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        if let (Some(won), Some(net)) = (game.last_win, game.last_net_amount) {
            let (text, color) = if won {
                ("THẮNG", Color::Green)
            } else {
                ("THUA", Color::Red)
            };
            lines.push(Line::styled(
                format!("{text} {} VND", format_signed_currency(net)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
    }
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Đĩa"));
    f.render_widget(widget, area);
}

/// Most recent totals that fit in `width` columns, oldest first.
fn visible_history(history: &[u8], width: u16) -> &[u8] {
    let mut used = 0usize;
    let mut start = history.len();
    for total in history.iter().rev() {
        let cell = total.to_string().width() + 1;
        if used + cell > usize::from(width) {
            break;
        }
        used += cell;
        start -= 1;
    }
    &history[start..]
}

fn draw_history(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let block = Block::default().borders(Borders::ALL).title("Soi cầu");
    let inner = block.inner(area);
    let spans: Vec<Span> = visible_history(&snap.game.history, inner.width)
        .iter()
        .map(|total| {
            let side = if TAI_TOTALS.contains(total) {
                Side::Tai
            } else {
                Side::Xiu
            };
            Span::styled(format!("{total} "), Style::default().fg(side_color(side)))
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = vec![Line::from(snap.status.clone())];
    if let Some((message, kind)) = &snap.notification {
        let color = match kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
            NotificationKind::Info => Color::Cyan,
        };
        lines.push(Line::styled(
            message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "t/← cược TÀI | x/→ cược XỈU | + nạp tiền | m âm thanh | r hủy ván | i luật | q thoát",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    match &state.mode {
        Mode::BetModal(bs) => {
            let area = centered_rect(50, 40, f.area());
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(side_color(bs.side)))
                .title(format!("Đặt cược {}", bs.side));
            let balance = snap.game.balance;
            let amount_style = if bs.amount > balance {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };
            let chips: Vec<Span> = snap
                .quick_amounts
                .iter()
                .enumerate()
                .map(|(i, chip)| {
                    let style = if i == bs.chip {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!(" {} ", format_currency(*chip)), style)
                })
                .collect();
            let confirm = if bs.can_confirm(balance) {
                "Enter=xác nhận"
            } else {
                "Enter (chưa hợp lệ)"
            };
            let lines = vec![
                Line::from(format!("Số dư: {} VND", format_currency(balance))),
                Line::styled(
                    format!("Số tiền: {} VND", format_currency(bs.amount)),
                    amount_style.add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from(chips),
                Line::from(""),
                Line::from("←/→ chọn phỉnh | Space cộng | a ALL IN | c xóa | số để nhập"),
                Line::from(format!("{confirm} | Esc=hủy")),
            ];
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(Paragraph::new(lines), block.inner(area));
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Thoát game? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
