// SQLite 数据库实现

use super::DatabaseRepository;
use crate::models::AppointmentStatus;
use crate::storage::models::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::str::FromStr;
use tracing::{error, info, warn};

/// SQLite 数据库实现
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// 创建新的 SQLite 数据库连接
    pub async fn new(db_path: &str) -> Result<Self> {
        info!("初始化 SQLite 数据库: {}", db_path);

        // 确保数据库文件的目录存在
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        // 并发预订依赖 busy_timeout 等待写锁
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))?
            .busy_timeout(std::time::Duration::from_secs(10));

        // 创建连接池
        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .idle_timeout(std::time::Duration::from_secs(180))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect_with(options)
            .await?;

        let repo = Self { pool };

        // 初始化表结构
        repo.initialize_tables().await?;

        Ok(repo)
    }

    /// 在已持有写锁的连接上执行预订
    async fn book_locked(
        conn: &mut SqliteConnection,
        slot_id: i64,
        patient_id: i64,
        reason: &str,
    ) -> Result<BookingOutcome> {
        let now = Utc::now();

        // 条件更新：只有可用时段才会被置为已预订
        let updated = sqlx::query(
            "UPDATE appointment_times SET is_booked = 1, updated_at = ? WHERE id = ? AND is_booked = 0",
        )
        .bind(now)
        .bind(slot_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if updated == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT id FROM appointment_times WHERE id = ?")
                    .bind(slot_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            return Ok(match exists {
                Some(_) => BookingOutcome::AlreadyBooked,
                None => BookingOutcome::SlotMissing,
            });
        }

        let mut appointment = Appointment {
            id: None,
            appointment_time_id: slot_id,
            patient_id,
            status: AppointmentStatus::Pending.as_str().to_string(),
            reason: reason.to_string(),
            created_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO appointments (appointment_time_id, patient_id, status, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        )
        .bind(appointment.appointment_time_id)
        .bind(appointment.patient_id)
        .bind(&appointment.status)
        .bind(&appointment.reason)
        .bind(appointment.created_at)
        .execute(&mut *conn)
        .await?;

        appointment.id = Some(result.last_insert_rowid());
        Ok(BookingOutcome::Booked(appointment))
    }

    /// 在已持有写锁的连接上执行取消
    async fn cancel_locked(
        conn: &mut SqliteConnection,
        appointment_id: i64,
    ) -> Result<CancelOutcome> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, appointment_time_id, patient_id, status, reason, created_at
            FROM appointments
            WHERE id = ?
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(appointment) = appointment else {
            return Ok(CancelOutcome::AppointmentMissing);
        };

        let released = sqlx::query(
            "UPDATE appointment_times SET is_booked = 0, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(appointment.appointment_time_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if released == 0 {
            return Ok(CancelOutcome::SlotMissing);
        }

        sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(appointment_id)
            .execute(&mut *conn)
            .await?;

        Ok(CancelOutcome::Cancelled(appointment))
    }

    /// 归还连接；事务没有正常结束时断开连接，不放回连接池
    fn release<T>(conn: PoolConnection<Sqlite>, result: &Result<T>) {
        if result.is_err() {
            warn!("事务未正常结束，丢弃该连接");
            drop(conn.detach());
        }
    }

    /// 结束 BEGIN IMMEDIATE 事务：`commit` 为 true 时提交，否则回滚
    async fn finish_immediate<T>(
        conn: &mut SqliteConnection,
        outcome: Result<T>,
        commit: impl FnOnce(&T) -> bool,
    ) -> Result<T> {
        match outcome {
            Ok(value) => {
                let statement = if commit(&value) { "COMMIT" } else { "ROLLBACK" };
                if let Err(e) = sqlx::query(statement).execute(&mut *conn).await {
                    // COMMIT 失败时事务仍然打开，需要显式回滚
                    if let Err(rollback_err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                        error!("事务回滚失败: {}", rollback_err);
                    }
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    error!("事务回滚失败: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl DatabaseRepository for SqliteRepository {
    // ========== 用户操作 ==========

    async fn insert_user(&self, user: &User) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let user_id = user.id.context("更新用户时缺少 ID")?;

        sqlx::query(
            "UPDATE users SET name = ?, email = ?, password_hash = ?, role = ? WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("删除用户: {}", user_id);
        Ok(result.rows_affected())
    }

    // ========== 诊所操作 ==========

    async fn insert_clinic(&self, clinic: &Clinic) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO clinics (name, address, phone, location, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        )
        .bind(&clinic.name)
        .bind(&clinic.address)
        .bind(&clinic.phone)
        .bind(&clinic.location)
        .bind(clinic.created_at)
        .bind(clinic.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_clinic(&self, clinic_id: i64) -> Result<Option<Clinic>> {
        let clinic = sqlx::query_as::<_, Clinic>(
            r#"
            SELECT id, name, address, phone, location, created_at, updated_at
            FROM clinics
            WHERE id = ?
            "#,
        )
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clinic)
    }

    async fn get_clinic_by_name(&self, name: &str) -> Result<Option<Clinic>> {
        let clinic = sqlx::query_as::<_, Clinic>(
            r#"
            SELECT id, name, address, phone, location, created_at, updated_at
            FROM clinics
            WHERE name = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clinic)
    }

    async fn get_all_clinics(&self) -> Result<Vec<Clinic>> {
        let clinics = sqlx::query_as::<_, Clinic>(
            r#"
            SELECT id, name, address, phone, location, created_at, updated_at
            FROM clinics
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clinics)
    }

    async fn update_clinic(&self, clinic: &Clinic) -> Result<()> {
        let clinic_id = clinic.id.context("更新诊所时缺少 ID")?;

        sqlx::query(
            r#"
            UPDATE clinics
            SET name = ?, address = ?, phone = ?, location = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&clinic.name)
        .bind(&clinic.address)
        .bind(&clinic.phone)
        .bind(&clinic.location)
        .bind(clinic.updated_at)
        .bind(clinic_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_clinic(&self, clinic_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM clinics WHERE id = ?")
            .bind(clinic_id)
            .execute(&self.pool)
            .await?;

        info!("删除诊所: {}", clinic_id);
        Ok(result.rows_affected())
    }

    async fn get_clinic_disease_stats(&self) -> Result<Vec<ClinicDiseaseCountRow>> {
        let rows = sqlx::query_as::<_, ClinicDiseaseCountRow>(
            r#"
            SELECT
                c.name AS clinic_name,
                d.disease_name AS disease_name,
                COUNT(d.id) AS disease_count
            FROM clinics c
            JOIN appointment_times t ON t.clinic_id = c.id
            JOIN appointments a ON a.appointment_time_id = t.id
            JOIN diseases d ON d.appointment_id = a.id
            GROUP BY c.name, d.disease_name
            ORDER BY c.name, disease_count DESC, d.disease_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ========== 预约时段 ==========

    async fn insert_appointment_time(&self, slot: &AppointmentTime) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO appointment_times (doctor_id, clinic_id, available_time, is_booked, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        )
        .bind(slot.doctor_id)
        .bind(slot.clinic_id)
        .bind(slot.available_time)
        .bind(slot.is_booked)
        .bind(slot.created_at)
        .bind(slot.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_appointment_time(&self, slot_id: i64) -> Result<Option<AppointmentTime>> {
        let slot = sqlx::query_as::<_, AppointmentTime>(
            r#"
            SELECT id, doctor_id, clinic_id, available_time, is_booked, created_at, updated_at
            FROM appointment_times
            WHERE id = ?
            "#,
        )
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    async fn get_doctor_appointment_time(
        &self,
        slot_id: i64,
        doctor_id: i64,
    ) -> Result<Option<AppointmentTime>> {
        let slot = sqlx::query_as::<_, AppointmentTime>(
            r#"
            SELECT id, doctor_id, clinic_id, available_time, is_booked, created_at, updated_at
            FROM appointment_times
            WHERE id = ? AND doctor_id = ?
            "#,
        )
        .bind(slot_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    async fn get_appointment_times_by_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<AppointmentTime>> {
        let slots = sqlx::query_as::<_, AppointmentTime>(
            r#"
            SELECT id, doctor_id, clinic_id, available_time, is_booked, created_at, updated_at
            FROM appointment_times
            WHERE doctor_id = ?
            ORDER BY available_time
            "#,
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    async fn search_appointment_times(
        &self,
        doctor_id: Option<i64>,
        available_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<AppointmentTime>> {
        let slots = sqlx::query_as::<_, AppointmentTime>(
            r#"
            SELECT id, doctor_id, clinic_id, available_time, is_booked, created_at, updated_at
            FROM appointment_times
            WHERE (? IS NULL OR doctor_id = ?)
              AND (? IS NULL OR available_time = ?)
            ORDER BY available_time
            "#,
        )
        .bind(doctor_id)
        .bind(doctor_id)
        .bind(available_time)
        .bind(available_time)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    async fn update_appointment_time(&self, slot: &AppointmentTime) -> Result<()> {
        let slot_id = slot.id.context("更新时段时缺少 ID")?;

        sqlx::query(
            r#"
            UPDATE appointment_times
            SET clinic_id = ?, available_time = ?, is_booked = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(slot.clinic_id)
        .bind(slot.available_time)
        .bind(slot.is_booked)
        .bind(slot.updated_at)
        .bind(slot_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_appointment_time(&self, slot_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM appointment_times WHERE id = ?")
            .bind(slot_id)
            .execute(&self.pool)
            .await?;

        info!("删除预约时段: {}", slot_id);
        Ok(result.rows_affected())
    }

    // ========== 预约 ==========

    async fn book_appointment_time(
        &self,
        slot_id: i64,
        patient_id: i64,
        reason: &str,
    ) -> Result<BookingOutcome> {
        let pool = self.pool.clone();
        let reason = reason.to_string();

        // 在独立任务中执行，请求被取消时事务仍会完整结束
        tokio::spawn(async move {
            let mut conn = pool.acquire().await?;

            // BEGIN IMMEDIATE 立即获取写锁，并发预订在 busy_timeout 内排队
            sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
            let outcome = Self::book_locked(&mut conn, slot_id, patient_id, &reason).await;

            let result = Self::finish_immediate(&mut conn, outcome, |o| {
                matches!(o, BookingOutcome::Booked(_))
            })
            .await;
            Self::release(conn, &result);
            result
        })
        .await?
    }

    async fn cancel_appointment(&self, appointment_id: i64) -> Result<CancelOutcome> {
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let mut conn = pool.acquire().await?;

            sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
            let outcome = Self::cancel_locked(&mut conn, appointment_id).await;

            let result = Self::finish_immediate(&mut conn, outcome, |o| {
                matches!(o, CancelOutcome::Cancelled(_))
            })
            .await;
            Self::release(conn, &result);
            result
        })
        .await?
    }

    async fn get_appointment(&self, appointment_id: i64) -> Result<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, appointment_time_id, patient_id, status, reason, created_at
            FROM appointments
            WHERE id = ?
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn get_appointments_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, appointment_time_id, patient_id, status, reason, created_at
            FROM appointments
            WHERE patient_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn update_appointment_status(&self, appointment_id: i64, status: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(status)
            .bind(appointment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ========== 疾病记录 ==========

    async fn insert_disease(&self, disease: &Disease) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO diseases (appointment_id, disease_name, description, diagnosis_date, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        )
        .bind(disease.appointment_id)
        .bind(&disease.disease_name)
        .bind(&disease.description)
        .bind(disease.diagnosis_date)
        .bind(&disease.status)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_disease(&self, disease_id: i64) -> Result<Option<Disease>> {
        let disease = sqlx::query_as::<_, Disease>(
            r#"
            SELECT id, appointment_id, disease_name, description, diagnosis_date, status
            FROM diseases
            WHERE id = ?
            "#,
        )
        .bind(disease_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(disease)
    }

    async fn get_diseases_by_appointment(&self, appointment_id: i64) -> Result<Vec<Disease>> {
        let diseases = sqlx::query_as::<_, Disease>(
            r#"
            SELECT id, appointment_id, disease_name, description, diagnosis_date, status
            FROM diseases
            WHERE appointment_id = ?
            ORDER BY diagnosis_date, id
            "#,
        )
        .bind(appointment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(diseases)
    }

    async fn update_disease(&self, disease: &Disease) -> Result<()> {
        let disease_id = disease.id.context("更新疾病记录时缺少 ID")?;

        sqlx::query(
            r#"
            UPDATE diseases
            SET appointment_id = ?, disease_name = ?, description = ?, diagnosis_date = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(disease.appointment_id)
        .bind(&disease.disease_name)
        .bind(&disease.description)
        .bind(disease.diagnosis_date)
        .bind(&disease.status)
        .bind(disease_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_disease(&self, disease_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM diseases WHERE id = ?")
            .bind(disease_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ========== 智能眼镜遥测 ==========

    async fn insert_smart_glasses_sample(&self, sample: &SmartGlassesSample) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO smart_glasses_data (user_id, posture_angle, eye_strain, timestamp)
            VALUES (?1, ?2, ?3, ?4)
        "#,
        )
        .bind(sample.user_id)
        .bind(sample.posture_angle)
        .bind(sample.eye_strain)
        .bind(sample.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_smart_glasses_samples(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SmartGlassesSample>> {
        let samples = sqlx::query_as::<_, SmartGlassesSample>(
            r#"
            SELECT id, user_id, posture_angle, eye_strain, timestamp
            FROM smart_glasses_data
            WHERE user_id = ? AND timestamp >= ? AND timestamp < ?
            ORDER BY timestamp, id
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }

    // ========== 数据库初始化和元数据 ==========

    async fn initialize_tables(&self) -> Result<()> {
        // 创建用户表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('patient', 'admin', 'doctor')),
                created_at DATETIME NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建诊所表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clinics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                phone TEXT,
                location TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建预约时段表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointment_times (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                doctor_id INTEGER NOT NULL,
                clinic_id INTEGER NOT NULL,
                available_time DATETIME NOT NULL,
                is_booked BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建预约表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                appointment_time_id INTEGER NOT NULL,
                patient_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'confirmed', 'cancelled', 'completed')),
                reason TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建疾病表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS diseases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                appointment_id INTEGER,
                disease_name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                diagnosis_date DATETIME NOT NULL,
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建智能眼镜数据表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS smart_glasses_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                posture_angle REAL,
                eye_strain REAL,
                timestamp DATETIME NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建索引
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointment_times_doctor_id ON appointment_times(doctor_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointment_times_clinic_id ON appointment_times(clinic_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments(patient_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_diseases_appointment_id ON diseases(appointment_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_smart_glasses_user_timestamp ON smart_glasses_data(user_id, timestamp)")
            .execute(&self.pool)
            .await?;

        info!("SQLite 数据库表初始化完成");
        Ok(())
    }

    fn db_type(&self) -> &str {
        "sqlite"
    }
}
