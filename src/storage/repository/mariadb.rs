// MariaDB 数据库实现

use super::DatabaseRepository;
use crate::models::AppointmentStatus;
use crate::storage::models::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

/// MariaDB 数据库实现
pub struct MariaDbRepository {
    pool: MySqlPool,
}

impl MariaDbRepository {
    /// 创建新的 MariaDB 数据库连接
    pub async fn new(
        host: &str,
        port: u16,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        info!(
            "初始化 MariaDB 数据库: {}@{}:{}/{}",
            username, host, port, database
        );

        // 先连接到服务器（不指定数据库），检查并创建数据库
        let server_url = format!(
            "mysql://{}:{}@{}:{}?connect_timeout=30",
            username, password, host, port
        );

        let server_pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&server_url)
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "连接 MariaDB 服务器失败 ({}:{}): {}\n\n请检查：\n1. MariaDB 服务是否已启动\n2. 主机地址和端口是否正确",
                    host, port, e
                )
            })?;

        let db_exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
        )
        .bind(database)
        .fetch_one(&server_pool)
        .await?;

        if db_exists == 0 {
            info!("数据库 '{}' 不存在，正在创建...", database);
            sqlx::query(&format!(
                "CREATE DATABASE `{}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci",
                database
            ))
            .execute(&server_pool)
            .await?;
        }

        server_pool.close().await;

        let connection_url = format!(
            "mysql://{}:{}@{}:{}/{}?connect_timeout=30",
            username, password, host, port, database
        );

        // 创建连接池
        let pool = MySqlPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .idle_timeout(std::time::Duration::from_secs(180))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&connection_url)
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "创建 MariaDB 连接池失败 ({}:{}/{}): {}",
                    host,
                    port,
                    database,
                    e
                )
            })?;

        info!("MariaDB 连接池创建成功");

        let repo = Self { pool };
        repo.initialize_tables().await?;

        Ok(repo)
    }
}

#[async_trait]
impl DatabaseRepository for MariaDbRepository {
    // ========== 用户操作 ==========

    async fn insert_user(&self, user: &User) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
        "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
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
            VALUES (?, ?, ?, ?, ?, ?)
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

        Ok(result.last_insert_id() as i64)
    }

    async fn get_clinic(&self, clinic_id: i64) -> Result<Option<Clinic>> {
        let clinic = sqlx::query_as::<_, Clinic>(
            "SELECT id, name, address, phone, location, created_at, updated_at FROM clinics WHERE id = ?",
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
            "SELECT id, name, address, phone, location, created_at, updated_at FROM clinics ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clinics)
    }

    async fn update_clinic(&self, clinic: &Clinic) -> Result<()> {
        let clinic_id = clinic.id.context("更新诊所时缺少 ID")?;

        sqlx::query(
            "UPDATE clinics SET name = ?, address = ?, phone = ?, location = ?, updated_at = ? WHERE id = ?",
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
            VALUES (?, ?, ?, ?, ?, ?)
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

        Ok(result.last_insert_id() as i64)
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
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // 条件更新持有行锁，并发预订会等待本事务结束后看到已预订状态
        let updated = sqlx::query(
            "UPDATE appointment_times SET is_booked = TRUE, updated_at = ? WHERE id = ? AND is_booked = FALSE",
        )
        .bind(now)
        .bind(slot_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT id FROM appointment_times WHERE id = ?")
                    .bind(slot_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
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
            VALUES (?, ?, ?, ?, ?)
        "#,
        )
        .bind(appointment.appointment_time_id)
        .bind(appointment.patient_id)
        .bind(&appointment.status)
        .bind(&appointment.reason)
        .bind(appointment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        appointment.id = Some(result.last_insert_id() as i64);
        Ok(BookingOutcome::Booked(appointment))
    }

    async fn cancel_appointment(&self, appointment_id: i64) -> Result<CancelOutcome> {
        let mut tx = self.pool.begin().await?;

        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, appointment_time_id, patient_id, status, reason, created_at
            FROM appointments
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(appointment) = appointment else {
            tx.rollback().await?;
            return Ok(CancelOutcome::AppointmentMissing);
        };

        let slot: Option<i64> =
            sqlx::query_scalar("SELECT id FROM appointment_times WHERE id = ? FOR UPDATE")
                .bind(appointment.appointment_time_id)
                .fetch_optional(&mut *tx)
                .await?;

        if slot.is_none() {
            tx.rollback().await?;
            return Ok(CancelOutcome::SlotMissing);
        }

        sqlx::query("UPDATE appointment_times SET is_booked = FALSE, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(appointment.appointment_time_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(appointment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CancelOutcome::Cancelled(appointment))
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
        // MySQL 默认返回实际变更行数，状态相同时为 0，需先确认记录存在
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM appointments WHERE id = ?")
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Ok(0);
        }

        sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(status)
            .bind(appointment_id)
            .execute(&self.pool)
            .await?;

        Ok(1)
    }

    // ========== 疾病记录 ==========

    async fn insert_disease(&self, disease: &Disease) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO diseases (appointment_id, disease_name, description, diagnosis_date, status)
            VALUES (?, ?, ?, ?, ?)
        "#,
        )
        .bind(disease.appointment_id)
        .bind(&disease.disease_name)
        .bind(&disease.description)
        .bind(disease.diagnosis_date)
        .bind(&disease.status)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
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
            VALUES (?, ?, ?, ?)
        "#,
        )
        .bind(sample.user_id)
        .bind(sample.posture_angle)
        .bind(sample.eye_strain)
        .bind(sample.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
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

    // ========== 数据库初始化 ==========

    async fn initialize_tables(&self) -> Result<()> {
        // 创建用户表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(16) NOT NULL,
                created_at DATETIME(6) NOT NULL,
                CHECK (role IN ('patient', 'admin', 'doctor'))
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建诊所表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clinics (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL,
                address VARCHAR(512) NOT NULL,
                phone VARCHAR(20),
                location VARCHAR(255) NOT NULL,
                created_at DATETIME(6) NOT NULL,
                updated_at DATETIME(6) NOT NULL,
                INDEX idx_clinics_name (name)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建预约时段表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointment_times (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                doctor_id BIGINT NOT NULL,
                clinic_id BIGINT NOT NULL,
                available_time DATETIME(6) NOT NULL,
                is_booked BOOLEAN NOT NULL DEFAULT FALSE,
                created_at DATETIME(6) NOT NULL,
                updated_at DATETIME(6) NOT NULL,
                INDEX idx_appointment_times_doctor_id (doctor_id),
                INDEX idx_appointment_times_clinic_id (clinic_id)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建预约表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                appointment_time_id BIGINT NOT NULL,
                patient_id BIGINT NOT NULL,
                status VARCHAR(16) NOT NULL DEFAULT 'pending',
                reason TEXT NOT NULL,
                created_at DATETIME(6) NOT NULL,
                CHECK (status IN ('pending', 'confirmed', 'cancelled', 'completed')),
                INDEX idx_appointments_patient_id (patient_id),
                INDEX idx_appointments_time_id (appointment_time_id)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建疾病表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS diseases (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                appointment_id BIGINT NULL,
                disease_name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                diagnosis_date DATETIME(6) NOT NULL,
                status VARCHAR(16) NOT NULL DEFAULT 'active',
                CHECK (status IN ('active', 'inactive')),
                INDEX idx_diseases_appointment_id (appointment_id)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建智能眼镜数据表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS smart_glasses_data (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                user_id BIGINT NOT NULL,
                posture_angle DOUBLE NULL,
                eye_strain DOUBLE NULL,
                timestamp DATETIME(6) NOT NULL,
                INDEX idx_smart_glasses_user_timestamp (user_id, timestamp)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
        )
        .execute(&self.pool)
        .await?;

        info!("MariaDB 数据库表初始化完成");
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mariadb"
    }
}
