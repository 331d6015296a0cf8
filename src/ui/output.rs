//! Styled status lines

use super::context::UiContext;
use console::style;

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!("{} {}", style("[OK]").green(), message);
    }
}

pub fn section(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        println!("  {} {} ({})", style("[OK]").green(), message, detail);
    }
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(message).ok();
    } else {
        println!("  {} {}", style("[WARN]").yellow(), message);
    }
}

pub fn step_skip(ctx: &UiContext, message: &str, reason: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(format!("{} ({})", style(message).dim(), reason)).ok();
    } else {
        println!("  {} {} ({})", style("[SKIP]").dim(), message, reason);
    }
}

/// Failure line followed by an optional hint
pub fn step_error_hint(ctx: &UiContext, message: &str, detail: &str, hint: Option<&str>) {
    if ctx.use_fancy_output() {
        let line = match hint {
            Some(hint) => format!("{}: {}\n{}", message, style(detail).red(), style(hint).dim()),
            None => format!("{}: {}", message, style(detail).red()),
        };
        cliclack::log::error(line).ok();
    } else {
        println!("  {} {}: {}", style("[FAIL]").red(), message, detail);
        if let Some(hint) = hint {
            println!("      {} {}", style("hint:").yellow(), hint);
        }
    }
}
