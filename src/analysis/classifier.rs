//! Clasificador de antigüedad
//!
//! Asigna a cada timestamp una de las cuatro categorías de frescura.
//! La fecha de referencia se fija una vez por corrida para que todas las
//! filas se clasifiquen contra el mismo "hoy".

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::models::connectivity::FreshnessCategory;

/// Fecha de referencia truncada al día, fijada al inicio de la corrida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate(NaiveDate);

impl ReferenceDate {
    pub fn new(today: NaiveDate) -> Self {
        Self(today)
    }

    /// Fecha UTC actual; los timestamps normalizados también están en UTC
    pub fn today_utc() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Días completos entre la fecha del timestamp y hoy.
    ///
    /// Negativo si el timestamp está en el futuro.
    pub fn age_in_days(&self, timestamp: NaiveDateTime) -> i64 {
        (self.0 - timestamp.date()).num_days()
    }
}

/// Resultado de clasificar un canal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub days: Option<i64>,
    pub category: FreshnessCategory,
}

/// Categoría para una antigüedad conocida o ausente.
///
/// Las edades negativas (fechas futuras) caen en "Conectado 0-2".
pub fn classify_age(age_days: Option<i64>) -> FreshnessCategory {
    match age_days {
        None => FreshnessCategory::STALEST,
        Some(age) if age <= 2 => FreshnessCategory::Conectado,
        Some(3..=14) => FreshnessCategory::Intermitente,
        Some(15..=30) => FreshnessCategory::Limitado,
        Some(_) => FreshnessCategory::Desconectado,
    }
}

pub fn classify(timestamp: Option<NaiveDateTime>, today: ReferenceDate) -> ChannelStatus {
    let days = timestamp.map(|ts| today.age_in_days(ts));
    ChannelStatus {
        days,
        category: classify_age(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> ReferenceDate {
        ReferenceDate::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    fn days_ago(days: i64) -> NaiveDateTime {
        (today().date() - chrono::Duration::days(days))
            .and_hms_opt(23, 59, 59)
            .unwrap()
    }

    #[test]
    fn test_boundaries_map_to_documented_side() {
        let cases = [
            (0, FreshnessCategory::Conectado),
            (2, FreshnessCategory::Conectado),
            (3, FreshnessCategory::Intermitente),
            (14, FreshnessCategory::Intermitente),
            (15, FreshnessCategory::Limitado),
            (30, FreshnessCategory::Limitado),
            (31, FreshnessCategory::Desconectado),
            (400, FreshnessCategory::Desconectado),
        ];
        for (age, expected) in cases {
            assert_eq!(classify_age(Some(age)), expected, "edad {age}");
        }
    }

    #[test]
    fn test_missing_timestamp_is_stalest() {
        let status = classify(None, today());
        assert_eq!(status.days, None);
        assert_eq!(status.category, FreshnessCategory::Desconectado);
    }

    #[test]
    fn test_every_age_has_exactly_one_category() {
        for age in -10..=60 {
            let category = classify_age(Some(age));
            let expected = if age <= 2 {
                FreshnessCategory::Conectado
            } else if age <= 14 {
                FreshnessCategory::Intermitente
            } else if age <= 30 {
                FreshnessCategory::Limitado
            } else {
                FreshnessCategory::Desconectado
            };
            assert_eq!(category, expected, "edad {age}");
        }
    }

    #[test]
    fn test_age_uses_calendar_days() {
        // Un timestamp de ayer a última hora cuenta como 1 día
        let status = classify(Some(days_ago(1)), today());
        assert_eq!(status.days, Some(1));

        let midnight = today().date().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(classify(Some(midnight), today()).days, Some(0));
    }

    // Fechas futuras se consideran frescas; pendiente de revisión de producto
    #[test]
    fn test_future_timestamp_is_conectado() {
        let status = classify(Some(days_ago(-5)), today());
        assert_eq!(status.days, Some(-5));
        assert_eq!(status.category, FreshnessCategory::Conectado);
    }
}
