// ============================================================================
// src/ui.rs – styled console output (stderr, so stdout carries only keys)
// ============================================================================

use console::{Style, Term};

pub const BANNER_BODY_WIDTH: usize = 56;

/// Console presenter. All methods are no-ops in quiet mode except `notice`
/// and `error`.
#[derive(Debug, Clone)]
pub struct UX {
    pub quiet: bool,
    term: Term,
}

impl UX {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            term: Term::stderr(),
        }
    }

    fn emit(&self, line: String) {
        let _ = self.term.write_line(&line);
    }

    pub fn banner(&self) {
        if self.quiet {
            return;
        }
        let frame = Style::new().color256(202).bold();
        let span = "═".repeat(BANNER_BODY_WIDTH + 2);
        let title = format!(
            "{:^width$}",
            "PBKDF2 FORGE // KEY DERIVATION",
            width = BANNER_BODY_WIDTH + 2
        );
        self.emit(frame.apply_to(format!("╔{}╗", span)).to_string());
        self.emit(frame.apply_to(format!("║{}║", title)).to_string());
        self.emit(frame.apply_to(format!("╚{}╝", span)).to_string());
    }

    pub fn phase(&self, title: &str) {
        if self.quiet {
            return;
        }
        let style = Style::new().color256(208).bold();
        self.emit(style.apply_to(format!("▸ {title}")).to_string());
    }

    pub fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.emit(format!("{} {}", Style::new().cyan().apply_to("[info]"), msg));
    }

    pub fn success(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.emit(format!("{} {}", Style::new().green().bold().apply_to("[ok]"), msg));
    }

    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.emit(format!("{} {}", Style::new().yellow().bold().apply_to("[warn]"), msg));
    }

    /// Information the user must keep. Printed even in quiet mode.
    pub fn notice(&self, msg: &str) {
        self.emit(format!("{} {}", Style::new().magenta().bold().apply_to("[keep]"), msg));
    }

    pub fn error(&self, msg: &str) {
        self.emit(format!("{} {}", Style::new().red().bold().apply_to("[fail]"), msg));
    }

    /// Two-column key/value panel.
    pub fn data_panel(&self, title: &str, rows: &[(&str, String)]) {
        if self.quiet {
            return;
        }
        let label_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let key_style = Style::new().color256(221).bold();
        self.phase(title);
        for (k, v) in rows {
            self.emit(format!(
                "  {}  {}",
                key_style.apply_to(format!("{:<width$}", k, width = label_width)),
                v
            ));
        }
    }
}
