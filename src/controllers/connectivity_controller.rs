use std::sync::Arc;

use validator::Validate;

use crate::analysis::roster_filter::SearchQuery;
use crate::dto::connectivity_dto::{
    ConnectivitySummaryResponse, GaugeCard, HistogramPanel, ProblemRow, ProblemsQuery,
    ProblemsResponse, SummaryQuery, GPS_GAUGE, MAX_PROBLEM_LIMIT, TELEMETRY_GAUGE,
};
use crate::services::connectivity_service::ConnectivityService;
use crate::utils::errors::AppError;

pub struct ConnectivityController {
    service: Arc<ConnectivityService>,
    default_limit: usize,
}

impl ConnectivityController {
    pub fn new(service: Arc<ConnectivityService>, default_limit: usize) -> Self {
        Self {
            service,
            default_limit,
        }
    }

    pub async fn summary(&self, query: SummaryQuery) -> Result<ConnectivitySummaryResponse, AppError> {
        query.validate()?;
        let search = SearchQuery::parse(query.q.as_deref());
        let overview = self.service.overview(search.as_ref()).await?;
        let thresholds = self.service.thresholds();
        let kpis = &overview.kpis;

        Ok(ConnectivitySummaryResponse {
            report_file: overview.report.file_name(),
            reference_date: overview.report.reference_date.date().to_string(),
            roster_units: overview.roster.index.entry_count(),
            filtered_units: overview.filtered_count,
            query: search.map(|s| s.as_str().to_string()),
            telemetria: GaugeCard::new(
                "Conectividad Telemetría Copiloto",
                format!("Conexión últimos {} días (CAN)", thresholds.telemetry_ok_days),
                &kpis.telemetria,
                TELEMETRY_GAUGE,
            ),
            gps: GaugeCard::new(
                "Conectividad GPS Copiloto",
                format!("Conexión últimos {} días (GPS global)", thresholds.gps_ok_days),
                &kpis.gps,
                GPS_GAUGE,
            ),
            histograma_telemetria: HistogramPanel::new(
                "Estado de conectividad Telemetría",
                &kpis.telemetria.histogram,
            ),
            histograma_gps: HistogramPanel::new("Estado de conectividad GPS", &kpis.gps.histogram),
        })
    }

    pub async fn problems(&self, query: ProblemsQuery) -> Result<ProblemsResponse, AppError> {
        query.validate()?;
        let limit = query
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_PROBLEM_LIMIT);
        let search = SearchQuery::parse(query.q.as_deref());
        let overview = self.service.overview(search.as_ref()).await?;

        let problems = &overview.kpis.problems;
        Ok(ProblemsResponse {
            report_file: overview.report.file_name(),
            total: problems.len(),
            limit,
            rows: problems.iter().take(limit).map(ProblemRow::from).collect(),
        })
    }

    pub async fn refresh(&self) {
        self.service.refresh().await;
    }
}
