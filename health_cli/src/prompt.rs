//! Interactive prompt flow.

use crate::CalcArgs;
use health_core::config::DefaultsConfig;
use health_core::input::{parse_positive_int, parse_positive_real};
use health_core::{ActivityLevel, Error, HeightUnit, RawInput, Result};
use std::io::{BufRead, Write};

/// Reads answers from `input`, writes prompts to `output`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Show `prompt` and read one trimmed line
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Error::InvalidInput("Unexpected end of input".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Ask until `check` accepts the answer, then return the answer text
    fn ask_until<T>(&mut self, prompt: &str, check: impl Fn(&str) -> Result<T>) -> Result<String> {
        loop {
            let answer = self.ask(prompt)?;
            match check(&answer) {
                Ok(_) => return Ok(answer),
                Err(Error::InvalidInput(msg)) => {
                    writeln!(self.output, "{}. Try again.", msg)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Yes/no question; anything but `y` (or end of input) is no
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.ask(prompt) {
            Ok(answer) => Ok(answer.eq_ignore_ascii_case("y")),
            Err(Error::InvalidInput(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fill every field not preset on the command line
    pub(crate) fn collect(&mut self, args: &CalcArgs, defaults: &DefaultsConfig) -> Result<RawInput> {
        let name = match &args.name {
            Some(name) => name.clone(),
            None => self.ask("Name (optional): ")?,
        };

        let age = match &args.age {
            Some(age) => age.clone(),
            None => self.ask_until("Age (years): ", |t| parse_positive_int("Age", t))?,
        };

        let gender = match &args.gender {
            Some(gender) => gender.clone(),
            None => {
                let answer = self.ask("Gender (Male/Female) [M/F]: ")?;
                if answer.is_empty() {
                    "F".to_string()
                } else {
                    answer
                }
            }
        };

        let height_unit = match &args.unit {
            Some(unit) => unit.clone(),
            None => self.ask_until(
                &format!(
                    "Height unit - enter 'cm' or 'm' (default {}): ",
                    defaults.height_unit
                ),
                |t| t.parse::<HeightUnit>(),
            )?,
        };
        let unit_label = if height_unit.trim().is_empty() {
            defaults.height_unit
        } else {
            height_unit.parse().unwrap_or(defaults.height_unit)
        };

        let height = match &args.height {
            Some(height) => height.clone(),
            None => self.ask_until(&format!("Height value ({}): ", unit_label), |t| {
                parse_positive_real("Height", t)
            })?,
        };

        let weight = match &args.weight {
            Some(weight) => weight.clone(),
            None => self.ask_until("Weight (kg): ", |t| parse_positive_real("Weight", t))?,
        };

        let activity = match &args.activity {
            Some(activity) => activity.clone(),
            None => {
                writeln!(self.output, "\nActivity Levels:")?;
                for level in ActivityLevel::ALL {
                    writeln!(self.output, " {}) {}", level.key(), level.label())?;
                }
                self.ask(&format!(
                    "Choose activity 1-5 (default {}): ",
                    defaults.activity.key()
                ))?
            }
        };

        Ok(RawInput {
            name,
            age,
            gender,
            height,
            height_unit,
            weight,
            activity,
        })
    }
}
