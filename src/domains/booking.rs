// 预约领域管理器
//
// 负责医生时段的发布、编辑、删除、查询，以及预约的创建、取消和状态变更。
// 时段状态只有两种：可用（is_booked = false）和已预订（is_booked = true），
// 预订和取消都是单次原子的仓库操作。

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::accounts::require_doctor;
use crate::error::{AppError, AppResult};
use crate::models::AppointmentStatus;
use crate::storage::{
    Appointment, AppointmentTime, AppointmentTimeChanges, BookingOutcome, CancelOutcome,
    DatabaseRepository,
};
use crate::utils::{parse_search_time, parse_slot_time, require_id, validate_id};

/// 发布时段请求（医生 ID 来自路径）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferSlotRequest {
    pub clinic_id: Option<i64>,
    /// `DD.MM.YYYY HH:MM:SS`，按 UTC 解释
    pub available_time: Option<String>,
}

/// 编辑时段请求，未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditSlotRequest {
    pub available_time: Option<String>,
    pub is_booked: Option<bool>,
    pub clinic_id: Option<i64>,
}

/// 搜索时段的查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotSearchQuery {
    pub doctor_id: Option<i64>,
    /// `DD.MM.YYYY HH:MM:SS±HH`
    pub available_time: Option<String>,
}

/// 创建预约请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookRequest {
    pub appointment_time_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub reason: Option<String>,
}

/// 修改预约状态请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

/// 预约领域管理器
#[derive(Clone)]
pub struct BookingDomain {
    repo: Arc<dyn DatabaseRepository>,
}

impl BookingDomain {
    /// 创建新的预约领域管理器
    pub fn new(repo: Arc<dyn DatabaseRepository>) -> Self {
        Self { repo }
    }

    // ==================== 时段 ====================

    /// 医生发布新的可用时段
    pub async fn offer_slot(
        &self,
        doctor_id: i64,
        req: OfferSlotRequest,
    ) -> AppResult<AppointmentTime> {
        let clinic_id = require_id("clinic_id", req.clinic_id)?;
        require_doctor(self.repo.as_ref(), doctor_id).await?;

        if self.repo.get_clinic(clinic_id).await?.is_none() {
            return Err(AppError::NotFound("clinic not found".to_string()));
        }

        let available_time = parse_slot_time(req.available_time.as_deref().unwrap_or_default())?;

        let now = Utc::now();
        let mut slot = AppointmentTime {
            id: None,
            doctor_id,
            clinic_id,
            available_time,
            is_booked: false,
            created_at: now,
            updated_at: now,
        };
        slot.id = Some(self.repo.insert_appointment_time(&slot).await?);

        info!(
            "医生 {} 发布时段 {:?}: {}",
            doctor_id, slot.id, slot.available_time
        );
        Ok(slot)
    }

    /// 获取医生的所有时段
    pub async fn list_doctor_slots(&self, doctor_id: i64) -> AppResult<Vec<AppointmentTime>> {
        require_doctor(self.repo.as_ref(), doctor_id).await?;
        Ok(self.repo.get_appointment_times_by_doctor(doctor_id).await?)
    }

    /// 编辑属于该医生的时段
    pub async fn edit_slot(
        &self,
        doctor_id: i64,
        slot_id: i64,
        req: EditSlotRequest,
    ) -> AppResult<AppointmentTime> {
        let mut slot = self.require_doctor_slot(doctor_id, slot_id).await?;

        let changes = AppointmentTimeChanges {
            available_time: match req.available_time.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => Some(parse_slot_time(value)?),
                _ => None,
            },
            is_booked: req.is_booked,
            clinic_id: req.clinic_id,
        };

        if let Some(clinic_id) = changes.clinic_id {
            validate_id("clinic_id", clinic_id)?;
            if self.repo.get_clinic(clinic_id).await?.is_none() {
                return Err(AppError::NotFound("clinic not found".to_string()));
            }
            slot.clinic_id = clinic_id;
        }
        if let Some(available_time) = changes.available_time {
            slot.available_time = available_time;
        }
        if let Some(is_booked) = changes.is_booked {
            slot.is_booked = is_booked;
        }
        slot.updated_at = Utc::now();

        self.repo.update_appointment_time(&slot).await?;
        info!("医生 {} 编辑时段 {}", doctor_id, slot_id);
        Ok(slot)
    }

    /// 删除时段
    ///
    /// 不检查是否已有预约，已预订时段的预约会失去对应时段
    pub async fn delete_slot(&self, doctor_id: i64, slot_id: i64) -> AppResult<()> {
        let slot = self.require_doctor_slot(doctor_id, slot_id).await?;

        if slot.is_booked {
            warn!("强制删除已预订的时段 {}（医生 {}）", slot_id, doctor_id);
        }

        if self.repo.delete_appointment_time(slot_id).await? == 0 {
            return Err(AppError::NotFound("appointment time not found".to_string()));
        }
        info!("医生 {} 删除时段 {}", doctor_id, slot_id);
        Ok(())
    }

    /// 按医生和/或精确时间搜索时段
    pub async fn search_slots(&self, query: SlotSearchQuery) -> AppResult<Vec<AppointmentTime>> {
        if let Some(doctor_id) = query.doctor_id {
            validate_id("doctor_id", doctor_id)?;
        }

        let available_time = match query.available_time.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_search_time(value)?),
            _ => None,
        };

        let slots = self
            .repo
            .search_appointment_times(query.doctor_id, available_time)
            .await?;

        if slots.is_empty() {
            return Err(AppError::NotFound("no appointment times found".to_string()));
        }
        Ok(slots)
    }

    async fn require_doctor_slot(&self, doctor_id: i64, slot_id: i64) -> AppResult<AppointmentTime> {
        validate_id("appointment_time_id", slot_id)?;
        require_doctor(self.repo.as_ref(), doctor_id).await?;

        self.repo
            .get_doctor_appointment_time(slot_id, doctor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("appointment time not found".to_string()))
    }

    // ==================== 预约 ====================

    /// 预订时段并创建 pending 预约
    pub async fn book(&self, req: BookRequest) -> AppResult<Appointment> {
        let slot_id = require_id("appointment_time_id", req.appointment_time_id)?;
        let patient_id = require_id("patient_id", req.patient_id)?;

        if self.repo.get_user(patient_id).await?.is_none() {
            return Err(AppError::NotFound("patient not found".to_string()));
        }

        let reason = req.reason.unwrap_or_default();
        match self
            .repo
            .book_appointment_time(slot_id, patient_id, reason.trim())
            .await?
        {
            BookingOutcome::Booked(appointment) => {
                info!(
                    "患者 {} 预订时段 {}，预约 {:?}",
                    patient_id, slot_id, appointment.id
                );
                Ok(appointment)
            }
            BookingOutcome::SlotMissing => {
                Err(AppError::NotFound("appointment time not found".to_string()))
            }
            BookingOutcome::AlreadyBooked => {
                warn!("时段 {} 已被预订，患者 {} 预订失败", slot_id, patient_id);
                Err(AppError::Conflict("appointment time is not available".to_string()))
            }
        }
    }

    /// 取消预约并释放时段
    pub async fn cancel(&self, appointment_id: i64) -> AppResult<Appointment> {
        validate_id("appointment_id", appointment_id)?;

        match self.repo.cancel_appointment(appointment_id).await? {
            CancelOutcome::Cancelled(appointment) => {
                info!(
                    "预约 {} 已取消，时段 {} 重新可用",
                    appointment_id, appointment.appointment_time_id
                );
                Ok(appointment)
            }
            CancelOutcome::AppointmentMissing => {
                Err(AppError::NotFound("appointment not found".to_string()))
            }
            CancelOutcome::SlotMissing => {
                warn!("预约 {} 引用的时段不存在", appointment_id);
                Err(AppError::NotFound("appointment time not found".to_string()))
            }
        }
    }

    /// 获取患者的所有预约
    pub async fn list_by_patient(&self, patient_id: i64) -> AppResult<Vec<Appointment>> {
        validate_id("patient_id", patient_id)?;

        let appointments = self.repo.get_appointments_by_patient(patient_id).await?;
        if appointments.is_empty() {
            return Err(AppError::NotFound("no appointments found".to_string()));
        }
        Ok(appointments)
    }

    /// 修改预约状态（不影响时段状态）
    pub async fn update_status(
        &self,
        appointment_id: i64,
        req: StatusRequest,
    ) -> AppResult<Appointment> {
        validate_id("appointment_id", appointment_id)?;

        let raw = req
            .status
            .ok_or_else(|| AppError::Validation("status is required".to_string()))?;
        let status = AppointmentStatus::parse(&raw)
            .ok_or_else(|| AppError::Validation(format!("invalid status: {}", raw)))?;

        if self
            .repo
            .update_appointment_status(appointment_id, status.as_str())
            .await?
            == 0
        {
            return Err(AppError::NotFound("appointment not found".to_string()));
        }

        info!("预约 {} 状态更新为 {}", appointment_id, status.as_str());
        self.repo
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::test_support::{open_repo, seed_clinic, seed_user};
    use tempfile::tempdir;

    struct Fixture {
        _dir: tempfile::TempDir,
        repo: Arc<dyn DatabaseRepository>,
        booking: BookingDomain,
        doctor_id: i64,
        patient_id: i64,
        clinic_id: i64,
    }

    async fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let repo = open_repo(&dir).await;
        let doctor_id = seed_user(repo.as_ref(), "doctor", "doc@example.com").await;
        let patient_id = seed_user(repo.as_ref(), "patient", "pat@example.com").await;
        let clinic_id = seed_clinic(repo.as_ref(), "Ortho Clinic").await;
        Fixture {
            _dir: dir,
            booking: BookingDomain::new(repo.clone()),
            repo,
            doctor_id,
            patient_id,
            clinic_id,
        }
    }

    fn offer(clinic_id: i64, time: &str) -> OfferSlotRequest {
        OfferSlotRequest {
            clinic_id: Some(clinic_id),
            available_time: Some(time.to_string()),
        }
    }

    fn book_req(slot_id: i64, patient_id: i64) -> BookRequest {
        BookRequest {
            appointment_time_id: Some(slot_id),
            patient_id: Some(patient_id),
            reason: Some("back pain".to_string()),
        }
    }

    #[tokio::test]
    async fn test_offer_creates_available_slot() {
        let f = fixture().await;

        let slot = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await
            .unwrap();
        assert!(!slot.is_booked);

        let listed = f.booking.list_doctor_slots(f.doctor_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_booked);
    }

    #[tokio::test]
    async fn test_offer_rejections() {
        let f = fixture().await;

        let no_clinic = f
            .booking
            .offer_slot(
                f.doctor_id,
                OfferSlotRequest {
                    clinic_id: None,
                    available_time: Some("26.11.2024 09:30:00".to_string()),
                },
            )
            .await;
        assert!(matches!(no_clinic, Err(AppError::Validation(_))));

        let not_doctor = f
            .booking
            .offer_slot(f.patient_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await;
        assert!(matches!(not_doctor, Err(AppError::NotFound(_))));

        let unknown_clinic = f
            .booking
            .offer_slot(f.doctor_id, offer(9999, "26.11.2024 09:30:00"))
            .await;
        assert!(matches!(unknown_clinic, Err(AppError::NotFound(_))));

        let bad_time = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "2024-11-26T09:30:00"))
            .await;
        assert!(matches!(bad_time, Err(AppError::Format(_))));

        let empty_time = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, ""))
            .await;
        assert!(matches!(empty_time, Err(AppError::Format(_))));
    }

    #[tokio::test]
    async fn test_book_cancel_rebook() {
        let f = fixture().await;
        let slot_id = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await
            .unwrap()
            .id
            .unwrap();

        let appointment = f.booking.book(book_req(slot_id, f.patient_id)).await.unwrap();
        assert_eq!(appointment.status, "pending");
        assert_eq!(appointment.appointment_time_id, slot_id);
        let slot = f.repo.get_appointment_time(slot_id).await.unwrap().unwrap();
        assert!(slot.is_booked);

        let second = f.booking.book(book_req(slot_id, f.patient_id)).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(
            f.booking.list_by_patient(f.patient_id).await.unwrap().len(),
            1
        );

        let cancelled = f.booking.cancel(appointment.id.unwrap()).await.unwrap();
        assert_eq!(cancelled.id, appointment.id);
        let slot = f.repo.get_appointment_time(slot_id).await.unwrap().unwrap();
        assert!(!slot.is_booked);
        assert!(matches!(
            f.booking.list_by_patient(f.patient_id).await,
            Err(AppError::NotFound(_))
        ));

        let rebooked = f.booking.book(book_req(slot_id, f.patient_id)).await.unwrap();
        assert_ne!(rebooked.id, appointment.id);

        assert!(matches!(
            f.booking.cancel(appointment.id.unwrap()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_book_missing_references() {
        let f = fixture().await;

        let no_slot = f.booking.book(book_req(4242, f.patient_id)).await;
        assert!(matches!(no_slot, Err(AppError::NotFound(_))));

        let no_patient = f.booking.book(book_req(1, 4242)).await;
        assert!(matches!(no_patient, Err(AppError::NotFound(_))));

        let missing_field = f
            .booking
            .book(BookRequest {
                patient_id: Some(f.patient_id),
                ..Default::default()
            })
            .await;
        assert!(matches!(missing_field, Err(AppError::Validation(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_booking_only_one_wins() {
        let f = fixture().await;
        let other_patient = seed_user(f.repo.as_ref(), "patient", "other@example.com").await;
        let slot_id = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "27.11.2024 10:00:00"))
            .await
            .unwrap()
            .id
            .unwrap();

        let (a, b) = tokio::join!(
            f.booking.book(book_req(slot_id, f.patient_id)),
            f.booking.book(book_req(slot_id, other_patient)),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            matches!(a, Err(AppError::Conflict(_))) || matches!(b, Err(AppError::Conflict(_)))
        );

        let slot = f.repo.get_appointment_time(slot_id).await.unwrap().unwrap();
        assert!(slot.is_booked);
    }

    #[tokio::test]
    async fn test_edit_and_delete_slot() {
        let f = fixture().await;
        let slot_id = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await
            .unwrap()
            .id
            .unwrap();
        let other_doctor = seed_user(f.repo.as_ref(), "doctor", "doc2@example.com").await;

        let foreign = f
            .booking
            .edit_slot(other_doctor, slot_id, EditSlotRequest::default())
            .await;
        assert!(matches!(foreign, Err(AppError::NotFound(_))));

        let bad_clinic = f
            .booking
            .edit_slot(
                f.doctor_id,
                slot_id,
                EditSlotRequest {
                    clinic_id: Some(777),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad_clinic, Err(AppError::NotFound(_))));

        let edited = f
            .booking
            .edit_slot(
                f.doctor_id,
                slot_id,
                EditSlotRequest {
                    available_time: Some("28.11.2024 14:00:00".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.available_time, parse_slot_time("28.11.2024 14:00:00").unwrap());
        assert_eq!(edited.clinic_id, f.clinic_id);

        // 已预订的时段也会被删除
        f.booking.book(book_req(slot_id, f.patient_id)).await.unwrap();
        f.booking.delete_slot(f.doctor_id, slot_id).await.unwrap();
        assert!(f.repo.get_appointment_time(slot_id).await.unwrap().is_none());
        assert!(matches!(
            f.booking.delete_slot(f.doctor_id, slot_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_after_slot_deleted_keeps_appointment() {
        let f = fixture().await;
        let slot_id = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await
            .unwrap()
            .id
            .unwrap();
        let appointment = f.booking.book(book_req(slot_id, f.patient_id)).await.unwrap();
        let appointment_id = appointment.id.unwrap();

        f.booking.delete_slot(f.doctor_id, slot_id).await.unwrap();

        let cancelled = f.booking.cancel(appointment_id).await;
        assert!(matches!(cancelled, Err(AppError::NotFound(_))));

        // 事务已回滚，预约仍然存在
        let still_there = f.repo.get_appointment(appointment_id).await.unwrap();
        assert!(still_there.is_some());
    }

    #[tokio::test]
    async fn test_search_normalizes_offset() {
        let f = fixture().await;
        f.booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await
            .unwrap();

        let found = f
            .booking
            .search_slots(SlotSearchQuery {
                doctor_id: Some(f.doctor_id),
                available_time: Some("26.11.2024 11:30:00+02".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = f
            .booking
            .search_slots(SlotSearchQuery {
                doctor_id: Some(f.doctor_id),
                available_time: Some("26.11.2024 11:30:00+00".to_string()),
            })
            .await;
        assert!(matches!(none, Err(AppError::NotFound(_))));

        let malformed = f
            .booking
            .search_slots(SlotSearchQuery {
                doctor_id: None,
                available_time: Some("26.11.2024".to_string()),
            })
            .await;
        assert!(matches!(malformed, Err(AppError::Format(_))));
    }

    #[tokio::test]
    async fn test_update_status_keeps_slot_booked() {
        let f = fixture().await;
        let slot_id = f
            .booking
            .offer_slot(f.doctor_id, offer(f.clinic_id, "26.11.2024 09:30:00"))
            .await
            .unwrap()
            .id
            .unwrap();
        let appointment = f.booking.book(book_req(slot_id, f.patient_id)).await.unwrap();
        let id = appointment.id.unwrap();

        let updated = f
            .booking
            .update_status(id, StatusRequest { status: Some("confirmed".to_string()) })
            .await
            .unwrap();
        assert_eq!(updated.status, "confirmed");

        let slot = f.repo.get_appointment_time(slot_id).await.unwrap().unwrap();
        assert!(slot.is_booked);

        let invalid = f
            .booking
            .update_status(id, StatusRequest { status: Some("lost".to_string()) })
            .await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));

        let missing = f
            .booking
            .update_status(9999, StatusRequest { status: Some("completed".to_string()) })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
