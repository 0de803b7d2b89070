//! Built-in command handlers. Handlers never fail: every problem becomes an
//! output line, and only successful commands carry a state patch or actions.

use crate::action::Action;
use crate::geo::GeoPoint;
use crate::uxv::{PatrolMode, WeaponType};
use crate::vfs::{is_restricted, HOME_PATH};

use super::registry::{CommandContext, CommandRegistry};
use super::result::{CommandResult, StatePatch};

pub const ALERT_DURATION_MS: u64 = 5_000;
pub const HQ_ZOOM: f64 = 12.0;
pub const ZOOM_MIN: f64 = 0.0;
pub const ZOOM_MAX: f64 = 22.0;
const SYSTEM_NAME: &str = "MissionOS 4.2.0 uxv-ctl";

const UXV_USAGE: &str = "usage: uxv <start [lng lat]|stop|goto <lng> <lat>|goto region <key>|speed <mps>|drop|return|follow <on|off>|weapon <type>|patrol <mode>|alt <meters>|charge <on|off>|fire [lng lat]|trail <n>>";

impl CommandRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, &str, &str, bool, BuiltinHandler); 25] = [
            ("help", "List commands", "", false, help),
            ("clear", "Clear the transcript", "", false, clear),
            ("close", "Close the terminal", "", false, close),
            ("login", "Authenticate as operator", "", false, login),
            ("logout", "Drop operator clearance", "", true, logout),
            ("classified", "Read the mission dossier", "", true, classified),
            ("regions", "List known regions", "", false, regions),
            ("companies", "List company headquarters", "", false, companies),
            ("goto", "Fly the map to a region or HQ", "<region> | hq <query>", false, goto),
            ("hq", "Fly the map to a company HQ", "<query>", false, hq),
            ("zoom", "Set map zoom", "<level>", false, zoom),
            ("center", "Center the map", "<lng> <lat>", false, center),
            ("scan", "Sweep the current sector", "", false, scan),
            ("uxv", "Command the vehicle", "<subcommand> [args...]", false, uxv),
            ("pwd", "Print working directory", "", false, pwd),
            ("ls", "List directory", "[path]", false, ls),
            ("cd", "Change directory", "[path]", false, cd),
            ("cat", "Print file", "<path>", false, cat),
            ("whoami", "Print current user", "", false, whoami),
            ("uname", "Print system name", "", false, uname),
            ("date", "Print current time", "", false, date),
            ("echo", "Print text", "<text...>", false, echo),
            ("man", "Show a command's manual", "<command>", false, man),
            ("sudo", "Run as superuser", "<command...>", false, sudo),
            ("probe", "Probe the relay", "", false, probe),
        ];
        for (name, help_text, schema, admin_only, handler) in builtins {
            registry
                .register(name, help_text, schema, admin_only, handler)
                .expect("built-in command registration should not fail");
        }
        registry
    }
}

type BuiltinHandler = fn(&CommandContext<'_>, &[String]) -> CommandResult;

fn help(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::lines(ctx.registry.iter_specs_in_order().map(|spec| {
        let tag = if spec.admin_only() { " [admin]" } else { "" };
        format!("{} - {}{tag}", spec.usage(), spec.help())
    }))
}

fn clear(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::empty().with_patch(StatePatch {
        clear_transcript: true,
        ..StatePatch::default()
    })
}

fn close(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::line("Closing terminal.").with_patch(StatePatch {
        is_open: Some(false),
        ..StatePatch::default()
    })
}

fn login(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    if ctx.state.is_admin {
        return CommandResult::line("Already authenticated.");
    }
    CommandResult::line("Enter operator password:").with_patch(StatePatch {
        awaiting_password: Some(true),
        ..StatePatch::default()
    })
}

fn logout(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::line("Operator clearance dropped.").with_patch(StatePatch {
        is_admin: Some(false),
        ..StatePatch::default()
    })
}

fn classified(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::lines([
        "=== CLASSIFIED: OPERATION NIGHTJAR ===",
        "Asset: UXV-7 long-endurance autonomous vehicle",
        "Payloads: projectile, laser, pulse, orbital uplink",
        "Standing orders: patrol, observe, report.",
    ])
}

fn regions(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    if ctx.geofences.is_empty() {
        return CommandResult::line("No regions configured.");
    }
    let keys: Vec<&str> = ctx.geofences.keys().collect();
    CommandResult::line(format!("Regions: {}", keys.join(", ")))
}

fn companies(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    if ctx.roster.is_empty() {
        return CommandResult::line("No companies on file.");
    }
    let names: Vec<&str> = ctx.roster.names().collect();
    CommandResult::line(format!("Companies: {}", names.join(", ")))
}

fn goto(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let Some(first) = args.first() else {
        return CommandResult::line("usage: goto <region> | goto hq <query>");
    };
    if first.eq_ignore_ascii_case("hq") {
        return hq(ctx, &args[1..]);
    }
    if args.len() != 1 {
        return CommandResult::line("usage: goto <region> | goto hq <query>");
    }
    match ctx.geofences.get(first) {
        Some(fence) => CommandResult::line(format!("Flying to {}.", fence.key))
            .with_action(Action::fly_to(fence.center(), Some(fence.camera_zoom()))),
        None => CommandResult::line(format!("Unknown region: {first}")),
    }
}

fn hq(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    if args.is_empty() {
        return CommandResult::line("usage: hq <query>");
    }
    let query = args.join(" ");
    match ctx.roster.find(&query) {
        Some(entry) => CommandResult::line(format!("Flying to {} HQ.", entry.name))
            .with_action(Action::fly_to(entry.location(), Some(HQ_ZOOM))),
        None => CommandResult::line(format!("Unknown company: {query}")),
    }
}

fn zoom(_ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let level = match args {
        [raw] => parse_number(raw).filter(|level| (ZOOM_MIN..=ZOOM_MAX).contains(level)),
        _ => None,
    };
    match level {
        Some(level) => CommandResult::line(format!("Zoom {level}.")).with_action(Action::Zoom {
            zoom: level,
            duration_ms: None,
        }),
        None => CommandResult::line("usage: zoom <level 0-22>"),
    }
}

fn center(_ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    match parse_point(args) {
        Some(point) => {
            CommandResult::line(format!("Centering on {:.4}, {:.4}.", point.lng, point.lat))
                .with_action(Action::fly_to(point, None))
        }
        None => CommandResult::line("usage: center <lng> <lat>"),
    }
}

fn scan(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::lines(["Scanning sector...", "No anomalies detected."])
        .with_action(Action::unlock("scanner"))
        .with_action(Action::play_sound("scan"))
}

fn uxv(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return CommandResult::line(UXV_USAGE);
    };
    match sub.to_ascii_lowercase().as_str() {
        "start" => match rest {
            [] => CommandResult::line("UXV launching at map center.")
                .with_action(Action::StartUxv { position: None }),
            _ => match parse_point(rest) {
                Some(point) => CommandResult::line("UXV launching.")
                    .with_action(Action::StartUxv {
                        position: Some(point),
                    }),
                None => CommandResult::line("usage: uxv start [lng lat]"),
            },
        },
        "stop" => CommandResult::line("UXV holding.").with_action(Action::StopUxv),
        "goto" => uxv_goto(ctx, rest),
        "speed" => match rest {
            [raw] => match parse_number(raw) {
                Some(speed) => CommandResult::line(format!("Speed set to {speed} m/s."))
                    .with_action(Action::UxvSpeed {
                        meters_per_second: speed,
                    }),
                None => CommandResult::line("usage: uxv speed <mps>"),
            },
            _ => CommandResult::line("usage: uxv speed <mps>"),
        },
        "drop" => CommandResult::line("Payload away.").with_action(Action::UxvDrop),
        "return" => CommandResult::line("Returning to base.").with_action(Action::UxvReturn),
        "follow" => match rest.first().map(|raw| parse_toggle(raw)) {
            Some(Some(enabled)) if rest.len() == 1 => CommandResult::line(if enabled {
                "Camera follow on."
            } else {
                "Camera follow off."
            })
            .with_action(Action::UxvFollow { enabled }),
            _ => CommandResult::line("usage: uxv follow <on|off>"),
        },
        "weapon" => match rest {
            [raw] => match WeaponType::parse(raw) {
                Some(weapon) => CommandResult::line(format!("Weapon: {}.", weapon.name()))
                    .with_action(Action::UxvWeapon { weapon }),
                None => CommandResult::line("usage: uxv weapon <projectile|laser|pulse|orbital>"),
            },
            _ => CommandResult::line("usage: uxv weapon <projectile|laser|pulse|orbital>"),
        },
        "patrol" => match rest {
            [raw] => match PatrolMode::parse(raw) {
                Some(mode) => CommandResult::line(format!("Patrol: {}.", mode.name()))
                    .with_action(Action::UxvPatrol { mode }),
                None => CommandResult::line(
                    "usage: uxv patrol <none|circle|figure8|random|zigzag>",
                ),
            },
            _ => CommandResult::line("usage: uxv patrol <none|circle|figure8|random|zigzag>"),
        },
        "alt" | "altitude" => match rest {
            [raw] => match parse_number(raw) {
                Some(meters) => CommandResult::line(format!("Altitude set to {meters} m."))
                    .with_action(Action::UxvAltitude { meters }),
                None => CommandResult::line("usage: uxv alt <meters>"),
            },
            _ => CommandResult::line("usage: uxv alt <meters>"),
        },
        "charge" => match rest.first().map(|raw| parse_toggle(raw)) {
            Some(Some(active)) if rest.len() == 1 => CommandResult::line(if active {
                "Charging weapon."
            } else {
                "Charge held."
            })
            .with_action(Action::UxvCharge { active }),
            _ => CommandResult::line("usage: uxv charge <on|off>"),
        },
        "fire" => match rest {
            [] => CommandResult::line("Firing.").with_action(Action::UxvFire { target: None }),
            _ => match parse_point(rest) {
                Some(point) => CommandResult::line("Firing.").with_action(Action::UxvFire {
                    target: Some(point),
                }),
                None => CommandResult::line("usage: uxv fire [lng lat]"),
            },
        },
        "trail" => match rest {
            [raw] => match raw.parse::<usize>() {
                Ok(max_length) => CommandResult::line(format!("Trail length {max_length}."))
                    .with_action(Action::UxvTrail { max_length }),
                Err(_) => CommandResult::line("usage: uxv trail <10-200>"),
            },
            _ => CommandResult::line("usage: uxv trail <10-200>"),
        },
        _ => CommandResult::line(UXV_USAGE),
    }
}

fn uxv_goto(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    if let [keyword, key] = args {
        if keyword.eq_ignore_ascii_case("region") {
            return match ctx.geofences.get(key) {
                Some(fence) => CommandResult::line(format!("UXV en route to {}.", fence.key))
                    .with_action(Action::UxvGoto {
                        target: fence.center(),
                    }),
                None => CommandResult::line(format!("Unknown region: {key}")),
            };
        }
    }
    match parse_point(args) {
        Some(target) => CommandResult::line(format!(
            "UXV en route to {:.4}, {:.4}.",
            target.lng, target.lat
        ))
        .with_action(Action::UxvGoto { target }),
        None => CommandResult::line("usage: uxv goto <lng> <lat> | uxv goto region <key>"),
    }
}

fn pwd(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::line(ctx.state.working_directory.clone())
}

fn ls(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let raw = args.first().map(String::as_str).unwrap_or(".");
    let path = ctx.vfs.resolve_path(&ctx.state.working_directory, raw);
    if let Some(entries) = ctx.vfs.list_directory(&path) {
        return CommandResult::line(entries.join("  "));
    }
    if ctx.vfs.exists(&path) {
        return CommandResult::line(raw.to_string());
    }
    CommandResult::line(format!("ls: {raw}: No such file or directory"))
}

fn cd(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let raw = args.first().map(String::as_str).unwrap_or(HOME_PATH);
    let path = ctx.vfs.resolve_path(&ctx.state.working_directory, raw);
    if !ctx.vfs.is_directory(&path) {
        return CommandResult::line(format!("cd: {raw}: No such directory"));
    }
    CommandResult::empty().with_patch(StatePatch {
        working_directory: Some(path),
        ..StatePatch::default()
    })
}

fn cat(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let Some(raw) = args.first() else {
        return CommandResult::line("usage: cat <path>");
    };
    let path = ctx.vfs.resolve_path(&ctx.state.working_directory, raw);
    if is_restricted(&path) && !ctx.state.is_admin {
        return CommandResult::line(format!("cat: {raw}: Permission denied"));
    }
    if ctx.vfs.is_directory(&path) {
        return CommandResult::line(format!("cat: {raw}: Is a directory"));
    }
    match ctx.vfs.read_file(&path) {
        Some(content) => CommandResult::lines(content.lines()),
        None => CommandResult::line(format!("cat: {raw}: No such file")),
    }
}

fn whoami(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::line(if ctx.state.is_admin { "root" } else { "guest" })
}

fn uname(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::line(SYSTEM_NAME)
}

fn date(ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::line(ctx.now.format("%a %b %e %H:%M:%S UTC %Y").to_string())
}

fn echo(_ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    CommandResult::line(args.join(" "))
}

fn man(ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::line("What manual page do you want?");
    };
    match ctx.registry.lookup(name) {
        Some(spec) => CommandResult::lines([
            format!("NAME: {}", spec.name()),
            format!("USAGE: {}", spec.usage()),
            format!("    {}", spec.help()),
        ]),
        None => CommandResult::line(format!("No manual entry for {name}")),
    }
}

fn sudo(_ctx: &CommandContext<'_>, args: &[String]) -> CommandResult {
    match args {
        [] => CommandResult::line("usage: sudo <command>"),
        [su] if su.eq_ignore_ascii_case("su") => CommandResult::lines([
            "sudo: authentication failure",
            "This incident will be reported.",
        ])
        .with_patch(StatePatch {
            alert_active: Some(true),
            ..StatePatch::default()
        })
        .with_action(Action::TriggerAlert {
            duration_ms: Some(ALERT_DURATION_MS),
        }),
        _ => CommandResult::line("sudo: guest is not in the sudoers file."),
    }
}

fn probe(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandResult {
    CommandResult::lines([
        "Relay responds with a riddle:",
        "  Major Tom calls and someone always answers. Who?",
    ])
    .with_patch(StatePatch {
        puzzle_stage: Some(1),
        ..StatePatch::default()
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_point(args: &[String]) -> Option<GeoPoint> {
    let [lng, lat] = args else {
        return None;
    };
    let point = GeoPoint::new(parse_number(lng)?, parse_number(lat)?);
    point.is_valid().then_some(point)
}

fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}
