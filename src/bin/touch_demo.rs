use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use touch_dispatch::config::AppConfig;
use touch_dispatch::input::{
    self, DelegateId, StandardTouchDelegate, TargetedTouchDelegate, Touch, TouchContext,
    TouchEvent, TouchPhase, TouchSet,
};

/// Plays a scripted touch sequence through the dispatcher
#[derive(Parser, Debug)]
#[command(name = "touch_demo", version)]
struct Args {
    /// Configuration profile to load
    #[arg(long, default_value = "release")]
    profile: String,

    /// Number of simultaneous touches per round
    #[arg(long, default_value_t = 2)]
    touches: u64,

    /// Start with touch dispatch disabled
    #[arg(long)]
    disable_dispatch: bool,
}

/// Swallows touches that start on it and unregisters itself when released
struct Button {
    id: Option<DelegateId>,
    width: f32,
    presses: u32,
}

impl TargetedTouchDelegate for Button {
    fn touch_began(&mut self, touch: &Touch, _ctx: &TouchContext<'_>) -> bool {
        touch.location[0] < self.width
    }

    fn touch_changed(&mut self, phase: TouchPhase, touch: &Touch, ctx: &TouchContext<'_>) {
        if phase == TouchPhase::Ended {
            self.presses += 1;
            info!(touch = %touch.id, frame = ctx.event().frame, "Button pressed, removing it");
            ctx.dispatcher().remove_delegate(self.id);
        }
    }

    fn name(&self) -> &str {
        "button"
    }
}

/// Follows every touch without swallowing it
#[derive(Default)]
struct Joystick {
    travel: [f32; 2],
}

impl TargetedTouchDelegate for Joystick {
    fn touch_began(&mut self, _touch: &Touch, _ctx: &TouchContext<'_>) -> bool {
        true
    }

    fn touch_changed(&mut self, phase: TouchPhase, touch: &Touch, _ctx: &TouchContext<'_>) {
        if phase == TouchPhase::Moved {
            let [dx, dy] = touch.delta();
            self.travel[0] += dx;
            self.travel[1] += dy;
        }
    }

    fn name(&self) -> &str {
        "joystick"
    }
}

/// Counts the touch batches that reach the standard phase
#[derive(Default)]
struct Camera {
    batches: HashMap<TouchPhase, usize>,
    touches: usize,
}

impl StandardTouchDelegate for Camera {
    fn touches(&mut self, phase: TouchPhase, touches: &TouchSet, _ctx: &TouchContext<'_>) {
        *self.batches.entry(phase).or_default() += 1;
        self.touches += touches.len();
    }

    fn name(&self) -> &str {
        "camera"
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = AppConfig::load(&args.profile);
    let mut config = loaded
        .as_ref()
        .cloned()
        .unwrap_or_else(|_| AppConfig::builtin(&args.profile));
    if args.disable_dispatch {
        config.touch.dispatch_events = false;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = &loaded {
        warn!(error = %e, "Failed to load config, using default configuration");
    }
    info!(profile = %config.profile, ?config.touch, "Starting touch demo");

    let dispatcher =
        input::shared::init(&config.touch).context("Failed to initialize touch dispatcher")?;

    let button = Rc::new(RefCell::new(Button {
        id: None,
        width: 100.0,
        presses: 0,
    }));
    let joystick = Rc::new(RefCell::new(Joystick::default()));
    let camera = Rc::new(RefCell::new(Camera::default()));

    let button_id = dispatcher.add_targeted_delegate(&button, 0, true)?;
    button.borrow_mut().id = Some(button_id);
    dispatcher.add_targeted_delegate(&joystick, 10, false)?;
    dispatcher.add_standard_delegate(&camera, 5)?;

    for (name, priority) in dispatcher.debug_handlers() {
        info!(%name, priority, "Registered touch delegate");
    }

    let mut frame = 0;
    for round in 0..2u64 {
        // Even touches start on the button, odd ones beside it
        let began: TouchSet = (0..args.touches)
            .map(|i| {
                let x = if i % 2 == 0 { 50.0 } else { 300.0 };
                Touch::new(round * 100 + i, [x, 40.0 * i as f32])
            })
            .collect();
        let moved: TouchSet = began
            .iter()
            .map(|t| t.moved_to([t.location[0] + 10.0, t.location[1] + 5.0]))
            .collect();

        for (phase, touches) in [
            (TouchPhase::Began, &began),
            (TouchPhase::Moved, &moved),
            (TouchPhase::Ended, &moved),
        ] {
            frame += 1;
            let event = TouchEvent::new(frame, Duration::from_millis(16 * frame));
            dispatcher.dispatch(phase, touches, &event);
        }

        info!(round, delegates = dispatcher.handler_count(), "Round finished");
    }

    print_summary(&button.borrow(), &joystick.borrow(), &camera.borrow());

    input::shared::shutdown();
    Ok(())
}

fn print_summary(button: &Button, joystick: &Joystick, camera: &Camera) {
    println!("\n{}", "Touch demo summary".bold());
    println!("  {:<10} presses: {}", "button".cyan(), button.presses);
    println!(
        "  {:<10} travel: ({:.1}, {:.1})",
        "joystick".cyan(),
        joystick.travel[0],
        joystick.travel[1]
    );

    let mut phases: Vec<_> = camera.batches.iter().collect();
    phases.sort_by_key(|(phase, _)| TouchPhase::ALL.iter().position(|p| p == *phase));
    for (phase, count) in phases {
        println!("  {:<10} {} batches: {}", "camera".cyan(), phase, count);
    }
    println!("  {:<10} touches seen: {}", "camera".cyan(), camera.touches);

    if button.presses == 0 {
        println!("  {}", "no touches were dispatched".yellow());
    } else {
        println!("  {}", "ok".green());
    }
}
