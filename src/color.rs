//! Material color state
//!
//! [`ColorStore`] holds the three channels driven by the sliders. It is owned
//! by the application state and notifies subscribers whenever a channel
//! actually changes. Raw slider input enters through [`parse_channel`], which
//! coerces and clamps it before it reaches the store.

use crate::error::ChannelError;
use std::fmt;
use tracing::warn;

/// 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const HOT_PINK: Rgb = Rgb::new(255, 105, 180);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`, `t = 1` gives `other`
    pub fn blend(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// CSS-style color string, e.g. `rgb(224,33,138)`
    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(color: Rgb) -> Self {
        crossterm::style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }

    pub fn next(self) -> Channel {
        match self {
            Channel::Red => Channel::Green,
            Channel::Green => Channel::Blue,
            Channel::Blue => Channel::Red,
        }
    }

    pub fn previous(self) -> Channel {
        match self {
            Channel::Red => Channel::Blue,
            Channel::Green => Channel::Red,
            Channel::Blue => Channel::Green,
        }
    }

    /// Pure color of this channel at the given intensity
    pub fn tint(self, value: u8) -> Rgb {
        match self {
            Channel::Red => Rgb::new(value, 0, 0),
            Channel::Green => Rgb::new(0, value, 0),
            Channel::Blue => Rgb::new(0, 0, value),
        }
    }
}

/// Parses raw slider output into a channel value.
///
/// Integers and finite decimals are accepted; decimals are rounded and the
/// result is clamped to `0..=255`. Empty and non-numeric input is rejected.
pub fn parse_channel(raw: &str) -> Result<u8, ChannelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChannelError::Empty);
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value.clamp(0, 255) as u8);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value.round().clamp(0.0, 255.0) as u8),
        _ => Err(ChannelError::NotANumber(trimmed.to_string())),
    }
}

/// A single channel update delivered to subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorChange {
    pub channel: Channel,
    pub old: u8,
    pub new: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ColorChange)>;

/// Observable store for the heart's material color
pub struct ColorStore {
    red: u8,
    green: u8,
    blue: u8,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl ColorStore {
    pub const DEFAULT_COLOR: Rgb = Rgb::new(224, 33, 138);

    pub fn new() -> Self {
        Self::with_color(Self::DEFAULT_COLOR)
    }

    pub fn with_color(color: Rgb) -> Self {
        ColorStore {
            red: color.r,
            green: color.g,
            blue: color.b,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    pub fn color(&self) -> Rgb {
        Rgb::new(self.red, self.green, self.blue)
    }

    /// Derived material color string
    pub fn css(&self) -> String {
        self.color().css()
    }

    pub fn set_red(&mut self, value: u8) {
        self.set(Channel::Red, value);
    }

    pub fn set_green(&mut self, value: u8) {
        self.set(Channel::Green, value);
    }

    pub fn set_blue(&mut self, value: u8) {
        self.set(Channel::Blue, value);
    }

    /// Overwrites one channel. Subscribers hear about it only if the value
    /// differs from the current one.
    pub fn set(&mut self, channel: Channel, value: u8) {
        let slot = match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        };
        let old = *slot;
        if old == value {
            return;
        }
        *slot = value;

        let change = ColorChange {
            channel,
            old,
            new: value,
        };
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&change);
        }
    }

    /// Parses raw slider output and stores it. The store is left untouched
    /// when the input is rejected.
    pub fn apply_raw(&mut self, channel: Channel, raw: &str) -> Result<u8, ChannelError> {
        let value = parse_channel(raw).inspect_err(|e| {
            warn!(channel = channel.label(), "rejected slider input: {e}");
        })?;
        self.set(channel, value);
        Ok(value)
    }

    /// Moves a channel by `delta`, saturating at the ends of the range
    pub fn nudge(&mut self, channel: Channel, delta: i16) -> u8 {
        let value = (self.get(channel) as i32 + delta as i32).clamp(0, 255) as u8;
        self.set(channel, value);
        value
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ColorChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }
}

impl Default for ColorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ColorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorStore")
            .field("red", &self.red)
            .field("green", &self.green)
            .field("blue", &self.blue)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    fn recording_store() -> (ColorStore, Rc<RefCell<Vec<ColorChange>>>) {
        let mut store = ColorStore::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        store.subscribe(move |change| sink.borrow_mut().push(*change));
        (store, changes)
    }

    #[test]
    fn starts_with_default_color() {
        let store = ColorStore::new();
        assert_eq!((store.red(), store.green(), store.blue()), (224, 33, 138));
        assert_eq!(store.css(), "rgb(224,33,138)");
    }

    #[test]
    fn set_red_only_touches_red() {
        let mut store = ColorStore::new();
        store.set_red(10);
        assert_eq!(store.red(), 10);
        assert_eq!(store.green(), 33);
        assert_eq!(store.blue(), 138);
        assert_eq!(store.css(), "rgb(10,33,138)");
    }

    #[test]
    fn setters_notify_on_change() {
        let (mut store, changes) = recording_store();
        store.set_green(40);
        store.set_blue(0);
        assert_eq!(
            *changes.borrow(),
            vec![
                ColorChange { channel: Channel::Green, old: 33, new: 40 },
                ColorChange { channel: Channel::Blue, old: 138, new: 0 },
            ]
        );
    }

    #[test]
    fn setters_are_idempotent() {
        let (mut store, changes) = recording_store();
        for _ in 0..2 {
            store.set_red(7);
            store.set_green(8);
            store.set_blue(9);
        }
        assert_eq!(changes.borrow().len(), 3);
        assert_eq!(store.color(), Rgb::new(7, 8, 9));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let (mut store, changes) = recording_store();
        let id = store.subscribe(|_| {});
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.set_red(1);
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn parse_channel_clamps_and_coerces() {
        assert_eq!(parse_channel("128"), Ok(128));
        assert_eq!(parse_channel(" 42 "), Ok(42));
        assert_eq!(parse_channel("300"), Ok(255));
        assert_eq!(parse_channel("-5"), Ok(0));
        assert_eq!(parse_channel("12.6"), Ok(13));
        assert_eq!(parse_channel("1e9"), Ok(255));
    }

    #[test]
    fn parse_channel_rejects_garbage() {
        assert_eq!(parse_channel(""), Err(ChannelError::Empty));
        assert_eq!(parse_channel("   "), Err(ChannelError::Empty));
        assert_eq!(
            parse_channel("pink"),
            Err(ChannelError::NotANumber("pink".to_string()))
        );
        assert!(parse_channel("NaN").is_err());
        assert!(parse_channel("inf").is_err());
    }

    #[test]
    fn apply_raw_leaves_store_on_error() {
        let mut store = ColorStore::new();
        assert!(store.apply_raw(Channel::Red, "abc").is_err());
        assert_eq!(store.red(), 224);
        assert_eq!(store.apply_raw(Channel::Red, "999"), Ok(255));
        assert_eq!(store.red(), 255);
    }

    #[test]
    fn nudge_saturates() {
        let mut store = ColorStore::new();
        assert_eq!(store.nudge(Channel::Red, 100), 255);
        assert_eq!(store.nudge(Channel::Green, -100), 0);
        assert_eq!(store.nudge(Channel::Blue, 2), 140);
        assert_eq!(store.nudge(Channel::Blue, i16::MAX), 255);
        assert_eq!(store.nudge(Channel::Blue, i16::MIN), 0);
    }

    #[test]
    fn apply_raw_warns_on_rejection() {
        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut store = ColorStore::new();
            assert!(store.apply_raw(Channel::Green, "lime").is_err());
            assert!(store.apply_raw(Channel::Green, "40").is_ok());
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 1, "{output}");
        assert!(output.contains("rejected slider input"));
        assert!(output.contains("lime"));
    }

    #[test]
    fn channel_cycle() {
        assert_eq!(Channel::Blue.next(), Channel::Red);
        assert_eq!(Channel::Red.previous(), Channel::Blue);
        assert_eq!(Channel::Green.tint(9), Rgb::new(0, 9, 0));
    }

    #[test]
    fn blend_endpoints() {
        let a = Rgb::new(0, 100, 200);
        assert_eq!(a.blend(Rgb::WHITE, 0.0), a);
        assert_eq!(a.blend(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.blend(Rgb::new(100, 50, 10), 0.5), Rgb::new(50, 25, 5));
    }
}
