//! FAO-56 Penman-Monteith daily reference evapotranspiration.

use std::f64::consts::PI;

use chrono::Datelike;
use demeter_kc::KcCurve;
use demeter_series::DayTable;
use tracing::{debug, warn};

use crate::error::Et0Error;
use crate::station::Station;
use crate::Et0Calculator;

/// Solar constant, MJ m^-2 min^-1.
const SOLAR_CONSTANT: f64 = 0.0820;

/// Stefan-Boltzmann constant at daily scale, MJ K^-4 m^-2 day^-1.
const STEFAN_BOLTZMANN: f64 = 4.903e-9;

/// Reference crop albedo.
const ALBEDO: f64 = 0.23;

/// FAO-56 Penman-Monteith calculator for daily data.
///
/// Required station variables: `tair_2m` (degC), `wind_speed` (m/s at 2 m),
/// `solar_radiation` (MJ m^-2 day^-1), `relative_humidity` (%). When
/// `tair_2m_min`/`tair_2m_max` are present they refine the vapor-pressure
/// and longwave terms; otherwise the daily mean stands in for both, per the
/// FAO-56 fallback for missing extremes.
pub struct PenmanFao56 {
    corrector: Option<KcCurve>,
}

impl PenmanFao56 {
    /// Registry name.
    pub const NAME: &'static str = "penman-fao56";

    /// Creates a calculator, optionally with a Kc correction curve.
    pub fn new(corrector: Option<KcCurve>) -> Self {
        Self { corrector }
    }

    fn validate(&self, data: &DayTable) -> Result<(), Et0Error> {
        if data.is_empty() {
            return Err(Et0Error::Validation {
                reason: "station table is empty".to_string(),
            });
        }
        if !data.is_contiguous_daily() {
            // An undeterminable frequency is tolerated; the bucket model
            // downstream treats the missing days as zero flux.
            warn!("station table has calendar gaps; daily frequency not verifiable");
        }
        for column in ["tair_2m", "wind_speed", "solar_radiation", "relative_humidity"] {
            if !data.has_column(column) {
                return Err(Et0Error::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Et0Calculator for PenmanFao56 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&self, station: &Station, correct: bool) -> Result<DayTable, Et0Error> {
        if correct && self.corrector.is_none() {
            return Err(Et0Error::CorrectorMissing);
        }

        let data = &station.data;
        self.validate(data)?;

        let tmean = data.column("tair_2m").expect("validated");
        let wind = data.column("wind_speed").expect("validated");
        let rs = data.column("solar_radiation").expect("validated");
        let rh = data.column("relative_humidity").expect("validated");
        let tmin = data.column("tair_2m_min");
        let tmax = data.column("tair_2m_max");
        if tmin.is_none() || tmax.is_none() {
            debug!("temperature extremes absent; using daily mean for vapor pressure terms");
        }

        let lat_rad = station.latitude.to_radians();
        let gamma = psychrometric_constant(station.elevation);

        let mut et0 = Vec::with_capacity(data.len());
        for (i, date) in data.dates().iter().enumerate() {
            let t = tmean[i];
            let t_min = tmin.map_or(t, |c| c[i]);
            let t_max = tmax.map_or(t, |c| c[i]);

            let es = (sat_vapor_pressure(t_max) + sat_vapor_pressure(t_min)) / 2.0;
            let ea = rh[i] / 100.0 * es;
            let delta = slope_vapor_pressure(t);

            let ra = extraterrestrial_radiation(lat_rad, date.ordinal());
            let rn = net_radiation(rs[i], ra, station.elevation, t_max, t_min, ea);

            // Soil heat flux G ~ 0 at daily scale (FAO-56 eq. 42).
            let num = 0.408 * delta * rn + gamma * (900.0 / (t + 273.0)) * wind[i] * (es - ea);
            let den = delta + gamma * (1.0 + 0.34 * wind[i]);
            et0.push((num / den).max(0.0));
        }

        let mut out = DayTable::new(data.dates().to_vec()).expect("dates come from a valid table");
        out.insert_column("et0", et0)
            .expect("fresh table cannot collide");

        if correct {
            let corrector = self.corrector.as_ref().expect("checked above");
            corrector.apply(&mut out, "et0")?;
        }

        Ok(out)
    }
}

/// Psychrometric constant from elevation, kPa/degC (FAO-56 eq. 7-8).
fn psychrometric_constant(elevation: f64) -> f64 {
    let pressure = 101.3 * ((293.0 - 0.0065 * elevation) / 293.0).powf(5.26);
    0.000665 * pressure
}

/// Saturation vapor pressure at temperature `t`, kPa (FAO-56 eq. 11).
fn sat_vapor_pressure(t: f64) -> f64 {
    0.6108 * ((17.27 * t) / (t + 237.3)).exp()
}

/// Slope of the saturation vapor pressure curve, kPa/degC (FAO-56 eq. 13).
fn slope_vapor_pressure(t: f64) -> f64 {
    4098.0 * sat_vapor_pressure(t) / (t + 237.3).powi(2)
}

/// Extraterrestrial radiation for a day of year, MJ m^-2 day^-1
/// (FAO-56 eq. 21-25).
fn extraterrestrial_radiation(lat_rad: f64, doy: u32) -> f64 {
    let j = f64::from(doy);
    let dr = 1.0 + 0.033 * (2.0 * PI / 365.0 * j).cos();
    let decl = 0.409 * (2.0 * PI / 365.0 * j - 1.39).sin();
    let ws = (-lat_rad.tan() * decl.tan()).clamp(-1.0, 1.0).acos();
    24.0 * 60.0 / PI
        * SOLAR_CONSTANT
        * dr
        * (ws * lat_rad.sin() * decl.sin() + lat_rad.cos() * decl.cos() * ws.sin())
}

/// Net radiation from measured shortwave radiation, MJ m^-2 day^-1
/// (FAO-56 eq. 37-40).
fn net_radiation(rs: f64, ra: f64, elevation: f64, t_max: f64, t_min: f64, ea: f64) -> f64 {
    let rso = (0.75 + 2e-5 * elevation) * ra;
    let rns = (1.0 - ALBEDO) * rs;
    let ratio = if rso > 0.0 { (rs / rso).min(1.0) } else { 1.0 };
    let tk4 = ((t_max + 273.16).powi(4) + (t_min + 273.16).powi(4)) / 2.0;
    let rnl = STEFAN_BOLTZMANN * tk4 * (0.34 - 0.14 * ea.max(0.0).sqrt()) * (1.35 * ratio - 0.35);
    rns - rnl
}
