use crate::{
    clock::{
        FiredTimer,
        RoundClock,
        Scheduler,
    },
    config::GameConfig,
    dice::{
        DiceSource,
        RandomDice,
        ScriptedDice,
        Side,
    },
    error::BetError,
    game::{
        Effect,
        GameEvent,
        GameSnapshot,
        TaiXiu,
    },
    round::Phase,
    settlement::Settlement,
    ui,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use itertools::Itertools;
use std::{
    io::Write,
    path::PathBuf,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time::Instant,
};
use tracing::{
    info,
    warn,
};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(1);
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const RULES_MESSAGE: &str = "Luật chơi: Dự đoán tổng điểm 3 viên xúc xắc";

#[derive(Clone, Debug)]
pub enum DiceMode {
    Random { seed: Option<u64> },
    /// Replays a fixed script of rolls, for demos.
    Rigged(ScriptedDice),
}

impl DiceMode {
    fn into_source(self) -> Box<dyn DiceSource> {
        match self {
            DiceMode::Random { seed: Some(seed) } => Box::new(RandomDice::seeded(seed)),
            DiceMode::Random { seed: None } => Box::new(RandomDice::from_os_rng()),
            DiceMode::Rigged(script) => Box::new(script),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub game: GameConfig,
    pub dice: DiceMode,
    pub log_dir: PathBuf,
    pub sound: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            dice: DiceMode::Random { seed: None },
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            sound: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    expires_at: Instant,
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub game: GameSnapshot,
    pub notification: Option<(String, NotificationKind)>,
    pub status: String,
    pub sound: bool,
    pub quick_amounts: Vec<u64>,
}

pub struct AppController {
    game: TaiXiu<Box<dyn DiceSource>>,
    scheduler: Scheduler,
    notification: Option<Notification>,
    status: String,
    sound: bool,
    /// Bells owed to the terminal; drained by the loop after a draw.
    pending_bells: usize,
}

impl AppController {
    pub fn new(config: AppConfig) -> (Self, mpsc::UnboundedReceiver<FiredTimer>) {
        let (scheduler, fired) = Scheduler::new();
        let controller = Self {
            game: TaiXiu::new(config.game, config.dice.into_source()),
            scheduler,
            notification: None,
            status: String::from("Mời đặt cược"),
            sound: config.sound,
            pending_bells: 0,
        };
        (controller, fired)
    }

    pub fn on_tick(&mut self) {
        let effects = self.game.tick();
        self.apply(effects);
    }

    pub fn on_timer(&mut self, fired: FiredTimer) {
        if self.scheduler.accept(&fired) {
            let effects = self.game.fire(fired.kind);
            self.apply(effects);
        }
    }

    pub fn check_bet(&mut self, side: Side) -> Result<(), BetError> {
        let checked = self.game.check_bet(side);
        if let Err(err) = checked {
            self.notify_bet_error(err);
        }
        checked
    }

    pub fn place_bet(&mut self, side: Side, amount: u64) {
        match self.game.place_bet(side, amount) {
            Ok(_) => {
                self.notify("Đặt cược thành công!", NotificationKind::Success);
                self.status = format!("Đã cược {} VND vào {}", format_currency(amount), side);
            }
            Err(err) => self.notify_bet_error(err),
        }
    }

    pub fn top_up(&mut self) {
        let amount = self.game.config().top_up_amount;
        self.game.request_balance_top_up(amount);
        self.notify(
            format!("Đã nạp {} VND!", format_currency(amount)),
            NotificationKind::Success,
        );
    }

    pub fn void_round(&mut self) {
        let effects = self.game.void_round();
        self.apply(effects);
    }

    pub fn toggle_sound(&mut self) {
        self.sound = !self.sound;
        let message = if self.sound {
            "Đã bật âm thanh"
        } else {
            "Đã tắt âm thanh"
        };
        self.notify(message, NotificationKind::Info);
    }

    pub fn show_rules(&mut self) {
        self.notify(RULES_MESSAGE, NotificationKind::Info);
    }

    pub fn notification_deadline(&self) -> Option<Instant> {
        self.notification.as_ref().map(|n| n.expires_at)
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.expires_at <= now)
        {
            self.notification = None;
        }
    }

    pub fn take_bells(&mut self) -> usize {
        std::mem::take(&mut self.pending_bells)
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            game: self.game.snapshot(),
            notification: self
                .notification
                .as_ref()
                .map(|n| (n.message.clone(), n.kind)),
            status: self.status.clone(),
            sound: self.sound,
            quick_amounts: self.game.config().quick_amounts.clone(),
        }
    }

    fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let message = message.into();
        info!(?kind, %message, "notification");
        self.notification = Some(Notification {
            message,
            kind,
            expires_at: Instant::now() + NOTIFICATION_TTL,
        });
    }

    fn notify_bet_error(&mut self, err: BetError) {
        let (message, kind) = match err {
            BetError::PhaseNotOpen { .. } => ("Đã hết thời gian cược!", NotificationKind::Info),
            BetError::ConflictingSide { .. } => {
                ("Bạn chỉ được cược 1 cửa!", NotificationKind::Error)
            }
            BetError::InsufficientBalance { .. } => ("Số dư không đủ!", NotificationKind::Error),
            BetError::ZeroAmount => ("Vui lòng nhập số tiền cược!", NotificationKind::Error),
        };
        self.notify(message, kind);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in self.scheduler.apply(effects) {
            if let Effect::Emit(event) = effect {
                self.on_event(event);
            }
        }
    }

    fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PhaseChanged { to, .. } => {
                match to {
                    Phase::Betting => self.status = String::from("Mời đặt cược"),
                    Phase::Lock => self.status = String::from("Khóa cược"),
                    Phase::Rolling => self.status = String::from("Đang lắc..."),
                    // RollFinalized follows with the dice
                    Phase::Result => {}
                }
            }
            GameEvent::RoundStarted { round_id } => {
                self.notification = None;
                info!(round_id, "new round on screen");
            }
            GameEvent::RollFinalized { settlement, .. } => {
                self.status = describe_roll(&settlement);
            }
            GameEvent::Settled { settlement, .. } => {
                let Some(net) = settlement.net() else {
                    return;
                };
                let verdict = if settlement.won() == Some(true) {
                    "THẮNG"
                } else {
                    "THUA"
                };
                self.status = format!(
                    "{} | {verdict} {} VND",
                    describe_roll(&settlement),
                    format_signed_currency(net)
                );
                if settlement.won() == Some(true) && self.sound {
                    self.pending_bells += 1;
                }
            }
            GameEvent::RoundVoided { round_id, refunded } => {
                warn!(round_id, ?refunded, "round voided by player");
                let message = match refunded {
                    Some(bet) => format!(
                        "Ván {round_id} đã hủy, hoàn {} VND",
                        format_currency(bet.amount)
                    ),
                    None => format!("Ván {round_id} đã hủy"),
                };
                self.notify(message, NotificationKind::Info);
            }
        }
    }
}

fn describe_roll(settlement: &Settlement) -> String {
    let faces = settlement
        .roll
        .faces()
        .iter()
        .map(|d| d.value())
        .join("-");
    let triple = if settlement.triple { " (bão)" } else { "" };
    format!(
        "Kết quả: {faces} = {} {}{triple}",
        settlement.total, settlement.label
    )
}

/// `10000000` -> `"10.000.000"`.
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let bytes = digits.as_bytes();
    let head = bytes.len() % 3;
    let mut groups: Vec<&str> = Vec::with_capacity(bytes.len() / 3 + 1);
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        (head..digits.len())
            .step_by(3)
            .map(|start| &digits[start..start + 3]),
    );
    groups.join(".")
}

/// Signed variant for the net result, e.g. `"+1.000.000"`.
pub fn format_signed_currency(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "+" };
    format!("{sign}{}", format_currency(amount.unsigned_abs()))
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let (controller, fired) = AppController::new(config);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    ui::terminal_enter(&mut ui_state)?;
    info!("UI ready");
    let res = run_loop(controller, fired, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    mut controller: AppController,
    mut fired: mpsc::UnboundedReceiver<FiredTimer>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    let mut clock = RoundClock::default();
    redraw(&mut controller, ui_state).wrap_err("initial draw failed")?;

    loop {
        let deadline = controller.notification_deadline();
        tokio::select! {
            _ = clock.tick() => {
                controller.on_tick();
            }
            Some(timer) = fired.recv() => {
                controller.on_timer(timer);
            }
            _ = notification_expiry(deadline) => {
                controller.expire_notification(Instant::now());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received");
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev.wrap_err("reading terminal input failed")?;
                let snapshot = controller.snapshot();
                let Some(ev) = ui::interpret_event(ui_state, event, &snapshot) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::OpenBet(side) => {
                        if controller.check_bet(side).is_ok() {
                            ui::open_bet_modal(ui_state, side);
                        }
                    }
                    ui::UserEvent::ConfirmBet { side, amount } => controller.place_bet(side, amount),
                    ui::UserEvent::TopUp => controller.top_up(),
                    ui::UserEvent::ToggleSound => controller.toggle_sound(),
                    ui::UserEvent::VoidRound => controller.void_round(),
                    ui::UserEvent::Rules => controller.show_rules(),
                    ui::UserEvent::Redraw => {}
                }
            }
        }
        redraw(&mut controller, ui_state).wrap_err("draw failed")?;
    }
    Ok(())
}

async fn notification_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn redraw(controller: &mut AppController, ui_state: &mut ui::UiState) -> Result<()> {
    let snapshot = controller.snapshot();
    ui::draw(ui_state, &snapshot)?;
    let bells = controller.take_bells();
    if bells > 0 {
        let mut out = std::io::stdout();
        out.write_all(&vec![0x07; bells])?;
        out.flush()?;
    }
    Ok(())
}
