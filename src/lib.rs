//! Terminal choropleth of US book bans. Clicking a state spreads its total
//! over its counties in proportion to their polygon areas.

pub mod alloc;
pub mod app;
pub mod braille;
pub mod data;
pub mod geo;
pub mod map;
pub mod region;
pub mod ui;
