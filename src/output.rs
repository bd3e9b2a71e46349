use owo_colors::OwoColorize;

/// Small wrapper around stdout/stderr printing to provide consistent,
/// colored user-facing messages. Colors are enabled only when output is a
/// TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix). Primary output such as the
/// preview listing goes through here so users can script against it.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// One source -> destination line of the preview listing.
pub fn print_mapping(src: &std::path::Path, dest: &std::path::Path) {
    if is_tty() {
        println!("{} {} {}", src.display(), "->".dimmed(), dest.display());
    } else {
        println!("{} -> {}", src.display(), dest.display());
    }
}
