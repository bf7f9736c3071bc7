//! Entry point for the sockdash TUI. Parses args, resolves the endpoint and runs the App.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use sockdash::app::{run_headless, App};
use sockdash::logging;
use sockdash::profiles::{
    load_profiles, save_profiles, validate_url, ProfileEntry, ProfileRequest, ResolveProfile,
    URL_ENV,
};
use sockdash::rate::SAMPLE_INTERVAL;

const USAGE: &str = "[--profile NAME|-P NAME] [--save] [--interval SECS|-i SECS] [--headless] [--dry-run] [--demo] [ws://HOST:PORT/ws]";
const DEMO_PORT: u16 = 3231;

#[derive(Debug, PartialEq)]
struct ParsedArgs {
    url: Option<String>,
    profile: Option<String>,
    interval: Duration,
    save: bool,
    demo: bool,
    dry_run: bool,
    headless: bool,
}

fn parse_interval(v: &str) -> Result<Duration, String> {
    match v.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(Duration::from_secs_f64(secs)),
        _ => Err(format!("invalid interval '{v}' (expected seconds > 0)")),
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "sockdash".into());
    let mut parsed = ParsedArgs {
        url: None,
        profile: None,
        interval: SAMPLE_INTERVAL,
        save: false,
        demo: false,
        dry_run: false,
        headless: false,
    };

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(format!("Usage: {prog} {USAGE}")),
            "--profile" | "-P" => parsed.profile = it.next(),
            "--interval" | "-i" => {
                let v = it.next().unwrap_or_default();
                parsed.interval = parse_interval(&v)?;
            }
            "--save" => parsed.save = true,
            "--demo" => parsed.demo = true,
            "--dry-run" => parsed.dry_run = true,
            "--headless" => parsed.headless = true,
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--interval=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    parsed.interval = parse_interval(v)?;
                }
            }
            _ => {
                if parsed.url.is_none() {
                    parsed.url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. Usage: {prog} {USAGE}"));
                }
            }
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let _log_guard = if parsed.headless {
        logging::init_stderr();
        None
    } else {
        let path = env::var_os(logging::LOG_FILE_ENV).map(PathBuf::from);
        logging::init_file(path.as_deref())
    };

    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        return run_demo_mode(&parsed).await;
    }

    if let Some(u) = parsed.url.as_deref() {
        validate_url(u).map_err(|e| anyhow!(e))?;
    }
    let Some(url) = resolve_url(&parsed)? else {
        return Ok(());
    };
    validate_url(&url).map_err(|e| anyhow!(e))?;

    if parsed.dry_run {
        println!("{url}");
        return Ok(());
    }
    run(url, &parsed).await
}

async fn run(url: String, parsed: &ParsedArgs) -> Result<()> {
    if parsed.headless {
        run_headless(url, parsed.interval).await
    } else {
        App::new(url, parsed.interval).run().await
    }
}

/// Work out the endpoint from args, saved profiles and the environment,
/// saving or prompting where needed. `None` means the user aborted.
fn resolve_url(parsed: &ParsedArgs) -> Result<Option<String>> {
    let mut profiles = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        env_url: env::var(URL_ENV).ok(),
    };

    let url = match req.resolve(&profiles) {
        ResolveProfile::Direct(u) => {
            if let Some(name) = parsed.profile.as_ref() {
                let entry = ProfileEntry { url: u.clone() };
                let write = match profiles.profiles.get(name) {
                    // New profile: save immediately
                    None => true,
                    Some(existing) if *existing != entry => {
                        parsed.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "))
                    }
                    Some(_) => false,
                };
                if write {
                    profiles.profiles.insert(name.clone(), entry);
                    save_profiles(&profiles)?;
                }
            }
            u
        }
        ResolveProfile::Loaded(u) | ResolveProfile::Env(u) => u,
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|idx| (1..=names.len()).contains(idx))
                .and_then(|idx| profiles.profiles.get(&names[idx - 1]));
            match picked {
                Some(entry) => entry.url.clone(),
                None => return Ok(None),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws or wss://...): ")?;
            let url = url.trim().to_string();
            if url.is_empty() {
                return Ok(None);
            }
            profiles.profiles.insert(name, ProfileEntry { url: url.clone() });
            save_profiles(&profiles)?;
            url
        }
        ResolveProfile::None => {
            eprintln!("No URL provided, no {URL_ENV} set and no profiles to select.");
            return Ok(None);
        }
    };
    Ok(Some(url))
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

async fn run_demo_mode(parsed: &ParsedArgs) -> Result<()> {
    let url = format!("ws://127.0.0.1:{DEMO_PORT}/ws");
    if parsed.dry_run {
        println!("{url}");
        return Ok(());
    }
    let _agent = spawn_demo_agent(DEMO_PORT, parsed.interval)?;
    // Give the agent a brief moment to bind
    tokio::time::sleep(Duration::from_millis(300)).await;
    tokio::select! {
        res = run(url, parsed) => res,
        _ = tokio::signal::ctrl_c() => Ok(()),
    }
}

/// Kills the demo agent when dropped.
struct DemoGuard(std::process::Child);

impl Drop for DemoGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_demo_agent(port: u16, interval: Duration) -> Result<DemoGuard> {
    let mut cmd = std::process::Command::new(find_agent_executable());
    cmd.arg("--port")
        .arg(port.to_string())
        .arg("--interval")
        .arg(interval.as_secs_f64().to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    let child = cmd
        .spawn()
        .map_err(|e| anyhow!("failed to start sockdash_agent for demo: {e}"))?;
    Ok(DemoGuard(child))
}

fn find_agent_executable() -> PathBuf {
    #[cfg(windows)]
    let name = "sockdash_agent.exe";
    #[cfg(not(windows))]
    let name = "sockdash_agent";
    if let Some(dir) = env::current_exe().ok().as_deref().and_then(|exe| exe.parent()) {
        let candidate = dir.join(name);
        if candidate.exists() {
            return candidate;
        }
    }
    // Fallback to relying on PATH
    PathBuf::from(name)
}
