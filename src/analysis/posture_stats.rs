//! 智能眼镜日统计
//!
//! 对单个受试者某一天（UTC）的遥测样本做一次扫描，累计三种超限状态的持续时间：
//! - 头部倾斜角度超过阈值
//! - 光照过低
//! - 光照过高
//!
//! 区间在条件首次成立的样本处开启，在条件不再成立的样本处关闭并计入时长。
//! 扫描结束时仍未关闭的区间不计入。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TelemetryConfig;
use crate::storage::SmartGlassesSample;

/// 日统计结果（单位：秒）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStatistics {
    pub time_head_tilt_exceeds_threshold: f64,
    pub time_low_signal: f64,
    pub time_high_signal: f64,
}

/// 设备上报的 0 表示未测量
pub fn normalize_reading(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// 单个条件的区间检测器
#[derive(Debug)]
struct IntervalDetector {
    start: Option<DateTime<Utc>>,
    total: Duration,
}

impl Default for IntervalDetector {
    fn default() -> Self {
        Self {
            start: None,
            total: Duration::zero(),
        }
    }
}

impl IntervalDetector {
    fn observe(&mut self, active: bool, at: DateTime<Utc>) {
        match (active, self.start) {
            (true, None) => self.start = Some(at),
            (false, Some(start)) => {
                self.total = self.total + (at - start);
                self.start = None;
            }
            _ => {}
        }
    }

    /// 纳秒精度换算为秒
    fn seconds(&self) -> f64 {
        match self.total.num_nanoseconds() {
            Some(ns) => ns as f64 / 1e9,
            None => self.total.num_milliseconds() as f64 / 1e3,
        }
    }
}

/// 计算某天的统计结果
///
/// 输入顺序不作要求，内部先按时间稳定排序；缺少角度或光照值的样本被跳过。
pub fn compute_daily_statistics(
    samples: &[SmartGlassesSample],
    day: NaiveDate,
    config: &TelemetryConfig,
) -> TelemetryStatistics {
    let mut readings: Vec<(DateTime<Utc>, f64, f64)> = samples
        .iter()
        .filter(|s| s.timestamp.date_naive() == day)
        .filter_map(|s| {
            let angle = normalize_reading(s.posture_angle)?;
            let signal = normalize_reading(s.eye_strain)?;
            Some((s.timestamp, angle, signal))
        })
        .collect();

    readings.sort_by_key(|(at, _, _)| *at);

    let mut head_tilt = IntervalDetector::default();
    let mut low_signal = IntervalDetector::default();
    let mut high_signal = IntervalDetector::default();

    for (at, angle, signal) in readings {
        head_tilt.observe(angle > config.posture_angle_threshold, at);
        low_signal.observe(signal < config.low_signal_threshold, at);
        high_signal.observe(signal > config.high_signal_threshold, at);
    }

    TelemetryStatistics {
        time_head_tilt_exceeds_threshold: head_tilt.seconds(),
        time_low_signal: low_signal.seconds(),
        time_high_signal: high_signal.seconds(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(at: DateTime<Utc>, angle: f64, signal: f64) -> SmartGlassesSample {
        SmartGlassesSample {
            id: None,
            user_id: 1,
            posture_angle: normalize_reading(Some(angle)),
            eye_strain: normalize_reading(Some(signal)),
            timestamp: at,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 1, 8, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
    }

    #[test]
    fn test_head_tilt_interval() {
        let t0 = t0();
        let samples = vec![
            sample(t0, 50.0, 500.0),
            sample(t0 + Duration::seconds(10), 50.0, 500.0),
            sample(t0 + Duration::seconds(15), 10.0, 500.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 15.0);
        assert_eq!(stats.time_low_signal, 0.0);
        assert_eq!(stats.time_high_signal, 0.0);
    }

    #[test]
    fn test_is_idempotent() {
        let t0 = t0();
        let samples = vec![
            sample(t0, 50.0, 50.0),
            sample(t0 + Duration::seconds(30), 20.0, 2000.0),
            sample(t0 + Duration::seconds(40), 20.0, 500.0),
        ];
        let config = TelemetryConfig::default();

        let first = compute_daily_statistics(&samples, day(), &config);
        let second = compute_daily_statistics(&samples, day(), &config);
        assert_eq!(first, second);
        assert_eq!(first.time_head_tilt_exceeds_threshold, 30.0);
        assert_eq!(first.time_low_signal, 30.0);
        assert_eq!(first.time_high_signal, 10.0);
    }

    #[test]
    fn test_zero_angle_sample_is_skipped() {
        let t0 = t0();
        let samples = vec![
            sample(t0, 50.0, 50.0),
            // 角度为 0，三个检测器都不处理，区间不会在这里关闭
            sample(t0 + Duration::seconds(5), 0.0, 500.0),
            sample(t0 + Duration::seconds(20), 10.0, 500.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 20.0);
        assert_eq!(stats.time_low_signal, 20.0);
    }

    #[test]
    fn test_missing_signal_is_skipped() {
        let t0 = t0();
        let mut missing = sample(t0 + Duration::seconds(5), 10.0, 500.0);
        missing.eye_strain = None;
        let samples = vec![
            sample(t0, 50.0, 500.0),
            missing,
            sample(t0 + Duration::seconds(8), 10.0, 500.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 8.0);
    }

    #[test]
    fn test_trailing_open_interval_is_dropped() {
        let t0 = t0();
        let samples = vec![
            sample(t0, 10.0, 50.0),
            sample(t0 + Duration::seconds(10), 10.0, 60.0),
            sample(t0 + Duration::seconds(20), 10.0, 70.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert_eq!(stats, TelemetryStatistics::default());
    }

    #[test]
    fn test_next_day_sample_is_excluded() {
        let t0 = Utc.with_ymd_and_hms(2024, 12, 1, 23, 59, 50).unwrap();
        let samples = vec![
            sample(t0, 50.0, 500.0),
            // 次日的样本不参与，区间保持未关闭
            sample(Utc.with_ymd_and_hms(2024, 12, 2, 0, 0, 0).unwrap(), 10.0, 500.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 0.0);

        let next = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        let stats = compute_daily_statistics(&samples, next, &TelemetryConfig::default());
        assert_eq!(stats, TelemetryStatistics::default());
    }

    #[test]
    fn test_unsorted_input_is_ordered() {
        let t0 = t0();
        let samples = vec![
            sample(t0 + Duration::seconds(15), 10.0, 500.0),
            sample(t0, 50.0, 500.0),
            sample(t0 + Duration::seconds(10), 50.0, 500.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 15.0);
    }

    #[test]
    fn test_thresholds_from_config() {
        let t0 = t0();
        let samples = vec![
            sample(t0, 30.0, 500.0),
            sample(t0 + Duration::seconds(12), 10.0, 500.0),
        ];
        let config = TelemetryConfig {
            posture_angle_threshold: 25.0,
            ..TelemetryConfig::default()
        };

        let stats = compute_daily_statistics(&samples, day(), &config);
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 12.0);
    }

    #[test]
    fn test_sub_millisecond_precision_is_kept() {
        let t0 = t0() + Duration::nanoseconds(123_456_789);
        let samples = vec![
            sample(t0, 50.0, 500.0),
            sample(t0 + Duration::microseconds(2_500_750), 10.0, 500.0),
        ];

        let stats = compute_daily_statistics(&samples, day(), &TelemetryConfig::default());
        assert!((stats.time_head_tilt_exceeds_threshold - 2.50075).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_reading() {
        assert_eq!(normalize_reading(Some(0.0)), None);
        assert_eq!(normalize_reading(None), None);
        assert_eq!(normalize_reading(Some(f64::NAN)), None);
        assert_eq!(normalize_reading(Some(12.5)), Some(12.5));
    }
}
