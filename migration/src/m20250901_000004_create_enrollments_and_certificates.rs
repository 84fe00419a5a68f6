use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_users_and_profiles::StudentProfiles;
use crate::m20250901_000002_create_catalog::Courses;

#[derive(DeriveIden)]
enum EnrolledCourses {
    Table,
    Id,
    StudentId,
    CourseId,
    Status,
    Amount,
    OrderId,
    PaymentToken,
    PaymentUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Certificates {
    Table,
    Id,
    StudentId,
    CourseId,
    EnrollmentId,
    CertificateNumber,
    PdfUrl,
    IssuedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("enrollment_status"))
                    .values(vec![
                        Alias::new("PENDING"),
                        Alias::new("COMPLETED"),
                        Alias::new("FAILED"),
                        Alias::new("CANCELLED"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnrolledCourses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnrolledCourses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnrolledCourses::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(EnrolledCourses::CourseId).big_integer().not_null())
                    .col(
                        ColumnDef::new(EnrolledCourses::Status)
                            .custom(Alias::new("enrollment_status"))
                            .not_null()
                            .default(Expr::cust("'PENDING'::enrollment_status")),
                    )
                    .col(
                        ColumnDef::new(EnrolledCourses::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(EnrolledCourses::OrderId).string_len(64).null())
                    .col(ColumnDef::new(EnrolledCourses::PaymentToken).string_len(255).null())
                    .col(ColumnDef::new(EnrolledCourses::PaymentUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(EnrolledCourses::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EnrolledCourses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrolled_courses_student")
                            .from(EnrolledCourses::Table, EnrolledCourses::StudentId)
                            .to(StudentProfiles::Table, StudentProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrolled_courses_course")
                            .from(EnrolledCourses::Table, EnrolledCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one enrollment row per student/course pair
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrolled_courses_student_course_unique")
                    .table(EnrolledCourses::Table)
                    .col(EnrolledCourses::StudentId)
                    .col(EnrolledCourses::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrolled_courses_order_unique")
                    .table(EnrolledCourses::Table)
                    .col(EnrolledCourses::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certificates::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Certificates::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Certificates::EnrollmentId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Certificates::CertificateNumber)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Certificates::PdfUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(Certificates::IssuedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Certificates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_student")
                            .from(Certificates::Table, Certificates::StudentId)
                            .to(StudentProfiles::Table, StudentProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_course")
                            .from(Certificates::Table, Certificates::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_enrollment")
                            .from(Certificates::Table, Certificates::EnrollmentId)
                            .to(EnrolledCourses::Table, EnrolledCourses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_certificates_student_course_unique")
                    .table(Certificates::Table)
                    .col(Certificates::StudentId)
                    .col(Certificates::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_certificates_number_unique")
                    .table(Certificates::Table)
                    .col(Certificates::CertificateNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Certificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(EnrolledCourses::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("enrollment_status")).to_owned())
            .await?;
        Ok(())
    }
}
