//! Line-oriented commands read by the driver.

use std::str::FromStr;

use thiserror::Error;

use crate::events::WheelGesture;
use crate::wheel::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Gesture(WheelGesture),
    Load,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseInputError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (expected drag, tap, load or quit)")]
    Unknown(String),
    #[error("usage: drag <x> <y>")]
    DragUsage,
}

impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ParseInputError::Empty)?;
        let input = match command.to_ascii_lowercase().as_str() {
            "drag" => {
                let mut coord = || {
                    words
                        .next()
                        .and_then(|w| w.parse::<f64>().ok())
                        .filter(|v| v.is_finite())
                        .ok_or(ParseInputError::DragUsage)
                };
                let x = coord()?;
                let y = coord()?;
                Input::Gesture(WheelGesture::Drag(Point::new(x, y)))
            }
            "tap" => Input::Gesture(WheelGesture::Tap),
            "load" => Input::Load,
            "quit" | "exit" => Input::Quit,
            other => return Err(ParseInputError::Unknown(other.to_string())),
        };
        if words.next().is_some() {
            return Err(match input {
                Input::Gesture(WheelGesture::Drag(_)) => ParseInputError::DragUsage,
                _ => ParseInputError::Unknown(line.trim().to_string()),
            });
        }
        Ok(input)
    }
}
