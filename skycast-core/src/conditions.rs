//! Mapping from the weather service's numeric condition codes to symbolic
//! icon and background categories.
//!
//! Code ranges follow the service's condition groups: 2xx thunderstorm,
//! 3xx drizzle, 5xx rain, 6xx snow, 7xx atmosphere (mist, fog, ...),
//! 800 clear, 80x clouds. Rendering (glyphs, colors) is the view's job.

/// Symbolic icon for a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Thunderstorm,
    Rain,
    Snow,
    Atmosphere,
    ClearDay,
    ClearNight,
    CloudsDay,
    CloudsNight,
    Clouds,
}

/// Background category for a condition code, applied to the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Stormy,
    Rainy,
    Snowy,
    Cloudy,
    Sunny,
}

/// Pick the icon for a condition code. `daytime` selects the day/night
/// variant for clear and partly-cloudy skies.
pub fn icon_for(code: u16, daytime: bool) -> Icon {
    match code {
        200..=299 => Icon::Thunderstorm,
        300..=599 => Icon::Rain,
        600..=699 => Icon::Snow,
        700..=799 => Icon::Atmosphere,
        800 => {
            if daytime {
                Icon::ClearDay
            } else {
                Icon::ClearNight
            }
        }
        801.. => {
            if daytime {
                Icon::CloudsDay
            } else {
                Icon::CloudsNight
            }
        }
        _ => Icon::Clouds,
    }
}

/// Pick the background category for a condition code.
pub fn background_for(code: u16) -> Background {
    match code {
        200..=299 => Background::Stormy,
        300..=599 => Background::Rainy,
        600..=699 => Background::Snowy,
        700..=799 => Background::Cloudy,
        800 => Background::Sunny,
        801.. => Background::Cloudy,
        _ => Background::Sunny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thunderstorm_range() {
        assert_eq!(icon_for(200, true), Icon::Thunderstorm);
        assert_eq!(icon_for(232, false), Icon::Thunderstorm);
        assert_eq!(icon_for(299, true), Icon::Thunderstorm);
        assert_eq!(background_for(211), Background::Stormy);
    }

    #[test]
    fn drizzle_and_rain_share_a_bucket() {
        assert_eq!(icon_for(300, true), Icon::Rain);
        assert_eq!(icon_for(500, true), Icon::Rain);
        assert_eq!(icon_for(599, false), Icon::Rain);
        assert_eq!(background_for(300), Background::Rainy);
        assert_eq!(background_for(531), Background::Rainy);
    }

    #[test]
    fn snow_range() {
        assert_eq!(icon_for(600, true), Icon::Snow);
        assert_eq!(icon_for(699, false), Icon::Snow);
        assert_eq!(background_for(622), Background::Snowy);
    }

    #[test]
    fn atmosphere_range() {
        assert_eq!(icon_for(700, true), Icon::Atmosphere);
        assert_eq!(icon_for(799, false), Icon::Atmosphere);
        assert_eq!(background_for(741), Background::Cloudy);
    }

    #[test]
    fn clear_has_day_and_night_variants() {
        assert_eq!(icon_for(800, true), Icon::ClearDay);
        assert_eq!(icon_for(800, false), Icon::ClearNight);
        assert_eq!(background_for(800), Background::Sunny);
    }

    #[test]
    fn clouds_above_800() {
        assert_eq!(icon_for(801, true), Icon::CloudsDay);
        assert_eq!(icon_for(804, false), Icon::CloudsNight);
        assert_eq!(background_for(801), Background::Cloudy);
        assert_eq!(background_for(804), Background::Cloudy);
    }

    #[test]
    fn out_of_range_codes_fall_back() {
        assert_eq!(icon_for(0, true), Icon::Clouds);
        assert_eq!(icon_for(199, false), Icon::Clouds);
        assert_eq!(background_for(0), Background::Sunny);
    }
}
