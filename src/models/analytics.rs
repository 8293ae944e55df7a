//! Modelos de Analytics
//!
//! Este módulo contiene los KPIs de conectividad calculados sobre el
//! conjunto filtrado: conteos OK, porcentajes e histogramas por categoría.

use serde::{Serialize, Serializer};

use crate::models::connectivity::FreshnessCategory;
use crate::models::vehicle::VehicleRecord;

/// Conteo de unidades por categoría, siempre con las cuatro categorías
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryHistogram {
    counts: [usize; 4],
}

/// Barra del histograma tal como la consume el dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBar {
    pub estado: FreshnessCategory,
    pub unidades: usize,
}

impl CategoryHistogram {
    pub fn record(&mut self, category: FreshnessCategory) {
        self.counts[category.ordinal()] += 1;
    }

    pub fn count(&self, category: FreshnessCategory) -> usize {
        self.counts[category.ordinal()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Pares (categoría, unidades) en orden canónico, incluyendo ceros
    pub fn iter(&self) -> impl Iterator<Item = (FreshnessCategory, usize)> + '_ {
        FreshnessCategory::ALL
            .into_iter()
            .map(move |category| (category, self.count(category)))
    }

    pub fn bars(&self) -> Vec<HistogramBar> {
        self.iter()
            .map(|(estado, unidades)| HistogramBar { estado, unidades })
            .collect()
    }
}

impl FromIterator<FreshnessCategory> for CategoryHistogram {
    fn from_iter<I: IntoIterator<Item = FreshnessCategory>>(iter: I) -> Self {
        let mut histogram = CategoryHistogram::default();
        for category in iter {
            histogram.record(category);
        }
        histogram
    }
}

impl Serialize for CategoryHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bars().serialize(serializer)
    }
}

/// KPIs de un canal (telemetría o GPS)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelKpi {
    pub total: usize,
    pub ok_count: usize,
    pub ok_pct: f64,
    /// Umbral de días usado para `ok_count`
    pub threshold_days: i64,
    pub histogram: CategoryHistogram,
}

/// Resultado completo del agregador
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityKpis {
    pub total: usize,
    pub telemetria: ChannelKpi,
    pub gps: ChannelKpi,
    /// Unidades con problemas, ya ordenadas por antigüedad
    pub problems: Vec<VehicleRecord>,
}
