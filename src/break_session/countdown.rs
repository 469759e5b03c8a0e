/// How the remaining time is rendered. Chosen once from the initial duration
/// and never re-derived, so a 90-second break reads "1:30" down to "0:01"
/// instead of flipping to bare seconds under a minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayStyle {
    MinutesSeconds,
    Seconds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownStep {
    Remaining(String),
    Finished,
}

/// Shared per-second countdown for one break session.
#[derive(Debug)]
pub struct BreakCountdown {
    seconds_remaining: u32,
    style: DisplayStyle,
}

impl BreakCountdown {
    pub fn new(duration_seconds: u32) -> Self {
        let style = if duration_seconds >= 60 {
            DisplayStyle::MinutesSeconds
        } else {
            DisplayStyle::Seconds
        };

        Self {
            seconds_remaining: duration_seconds,
            style,
        }
    }

    pub fn display(&self) -> String {
        match self.style {
            DisplayStyle::MinutesSeconds => format!(
                "{}:{:02}",
                self.seconds_remaining / 60,
                self.seconds_remaining % 60
            ),
            DisplayStyle::Seconds => self.seconds_remaining.to_string(),
        }
    }

    pub fn tick(&mut self) -> CountdownStep {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            CountdownStep::Finished
        } else {
            CountdownStep::Remaining(self.display())
        }
    }
}
