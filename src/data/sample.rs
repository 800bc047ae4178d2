//! Demonstration dataset: five products, ten functionalities, ten
//! components, ten incidents and their resolutions.

use serde::Serialize;

use crate::error::AppError;
use crate::services::OntologyManager;

pub const PRODUCTS: &[(&str, &str)] = &[
    ("ERP", "Enterprise Resource Planning - Sistema integral de gestión empresarial"),
    ("CRM", "Customer Relationship Management - Gestión de relaciones con clientes"),
    ("HRM", "Human Resource Management - Sistema de gestión de recursos humanos"),
    ("SCM", "Supply Chain Management - Gestión de la cadena de suministro"),
    ("BI", "Business Intelligence - Sistema de inteligencia de negocios"),
];

pub const FUNCTIONALITIES: &[(&str, &str)] = &[
    ("GESTION_USUARIOS", "Gestión de usuarios y permisos del sistema"),
    ("REPORTES", "Generación de reportes y análisis de datos"),
    ("INTEGRACION_API", "Integración con APIs externas"),
    ("AUTENTICACION", "Sistema de autenticación y seguridad"),
    ("BACKUP", "Sistema de respaldo y recuperación"),
    ("AUDITORIA", "Sistema de auditoría y trazabilidad"),
    ("NOTIFICACIONES", "Sistema de notificaciones y alertas"),
    ("EXPORTAR_DATOS", "Exportación de datos en múltiples formatos"),
    ("BUSQUEDA_AVANZADA", "Motor de búsqueda avanzado"),
    ("DASHBOARD", "Panel de control y métricas en tiempo real"),
];

pub const COMPONENTS: &[(&str, &str)] = &[
    ("FRONTEND_WEB", "Interfaz web principal de la aplicación"),
    ("BACKEND_API", "API REST principal del sistema"),
    ("BASE_DATOS", "Base de datos principal PostgreSQL"),
    ("SERVICIO_AUTH", "Microservicio de autenticación"),
    ("SISTEMA_CACHE", "Sistema de caché Redis"),
    ("PROCESAMIENTO_BATCH", "Sistema de procesamiento por lotes"),
    ("SISTEMA_COLAS", "Sistema de gestión de colas RabbitMQ"),
    ("MONITOREO", "Sistema de monitoreo y alertas"),
    ("INTEGRACIONES", "Módulo de integraciones externas"),
    ("SEGURIDAD", "Módulo de seguridad y cifrado"),
];

/// Product to functionality assignments. Every code on the right is a
/// functionality in [`FUNCTIONALITIES`].
pub const PRODUCT_ASSIGNMENTS: &[(&str, &[&str])] = &[
    (
        "ERP",
        &["GESTION_USUARIOS", "REPORTES", "INTEGRACION_API", "AUTENTICACION", "AUDITORIA", "EXPORTAR_DATOS"],
    ),
    (
        "CRM",
        &["GESTION_USUARIOS", "REPORTES", "NOTIFICACIONES", "BUSQUEDA_AVANZADA", "DASHBOARD"],
    ),
    (
        "HRM",
        &["GESTION_USUARIOS", "REPORTES", "AUTENTICACION", "AUDITORIA", "EXPORTAR_DATOS"],
    ),
    (
        "SCM",
        &["INTEGRACION_API", "REPORTES", "NOTIFICACIONES", "BUSQUEDA_AVANZADA"],
    ),
    (
        "BI",
        &["REPORTES", "BUSQUEDA_AVANZADA", "DASHBOARD", "EXPORTAR_DATOS", "INTEGRACION_API"],
    ),
];

pub const COMPONENT_ASSIGNMENTS: &[(&str, &[&str])] = &[
    ("FRONTEND_WEB", &["AUTENTICACION", "DASHBOARD", "BUSQUEDA_AVANZADA", "NOTIFICACIONES"]),
    ("BACKEND_API", &["INTEGRACION_API", "GESTION_USUARIOS", "AUDITORIA", "EXPORTAR_DATOS"]),
    ("BASE_DATOS", &["BACKUP", "AUDITORIA", "REPORTES"]),
    ("SERVICIO_AUTH", &["AUTENTICACION", "GESTION_USUARIOS"]),
    ("SISTEMA_CACHE", &["BUSQUEDA_AVANZADA", "DASHBOARD", "REPORTES"]),
    ("PROCESAMIENTO_BATCH", &["REPORTES", "EXPORTAR_DATOS", "BACKUP"]),
    ("SISTEMA_COLAS", &["NOTIFICACIONES", "INTEGRACION_API"]),
    ("MONITOREO", &["AUDITORIA", "NOTIFICACIONES", "DASHBOARD"]),
    ("INTEGRACIONES", &["INTEGRACION_API", "EXPORTAR_DATOS"]),
    ("SEGURIDAD", &["AUTENTICACION", "AUDITORIA", "GESTION_USUARIOS"]),
];

/// (code, description, SLA level, functionality)
pub const INCIDENTS: &[(&str, &str, &str, &str)] = &[
    ("INC001", "Error de autenticación al iniciar sesión", "SLA_HIGH", "AUTENTICACION"),
    ("INC002", "Lentitud en la generación de reportes mensuales", "SLA_MEDIUM", "REPORTES"),
    ("INC003", "Fallo en la integración con API externa", "SLA_CRITICAL", "INTEGRACION_API"),
    ("INC004", "Pérdida de datos en exportación masiva", "SLA_CRITICAL", "EXPORTAR_DATOS"),
    ("INC005", "Usuario no puede acceder al dashboard", "SLA_MEDIUM", "DASHBOARD"),
    ("INC006", "Timeout en búsqueda avanzada con grandes volúmenes", "SLA_MEDIUM", "BUSQUEDA_AVANZADA"),
    ("INC007", "Notificaciones no llegan a usuarios finales", "SLA_HIGH", "NOTIFICACIONES"),
    ("INC008", "Error en auditoría de accesos", "SLA_HIGH", "AUDITORIA"),
    ("INC009", "Fallo en backup programado", "SLA_CRITICAL", "BACKUP"),
    ("INC010", "Problemas de rendimiento en gestión de usuarios", "SLA_LOW", "GESTION_USUARIOS"),
];

/// (incident, resolution date, procedure)
pub const RESOLUTIONS: &[(&str, &str, &str)] = &[
    ("INC001", "2024-01-15T10:30:00Z", "Se reinició el servicio de autenticación y se limpió la caché de sesiones"),
    ("INC002", "2024-01-16T14:20:00Z", "Se optimizaron las consultas SQL y se agregaron índices a la base de datos"),
    ("INC003", "2024-01-14T09:15:00Z", "Se actualizó la versión del cliente HTTP y se reconfiguró el timeout"),
    ("INC004", "2024-01-13T16:45:00Z", "Se implementó procesamiento por lotes y se agregó validación de memoria"),
    ("INC005", "2024-01-17T11:00:00Z", "Se repararon los permisos de acceso y se regeneraron los tokens de sesión"),
    ("INC006", "2024-01-18T13:30:00Z", "Se implementó paginación y se mejoró el algoritmo de indexación"),
    ("INC007", "2024-01-16T15:45:00Z", "Se reconfiguró el servidor de correos y se verificaron las plantillas"),
    ("INC008", "2024-01-15T12:00:00Z", "Se reparó el trigger de auditoría y se reconstruyeron los logs"),
    ("INC009", "2024-01-13T08:00:00Z", "Se incrementó el espacio en disco y se reconfiguró el schedule"),
    ("INC010", "2024-01-19T17:20:00Z", "Se actualizó la librería de ORM y se optimizaron las consultas"),
];

/// Counts of what a seeding run wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedSummary {
    pub products: usize,
    pub functionalities: usize,
    pub components: usize,
    pub assignments: usize,
    pub incidents: usize,
    pub resolutions: usize,
}

/// Loads the demonstration dataset. Every write is an upsert, so seeding
/// twice leaves the graph unchanged.
///
/// Constraints are created first; the first failing step aborts the run.
pub async fn seed_sample_data(manager: &OntologyManager) -> Result<SeedSummary, AppError> {
    tracing::info!("Loading sample data");
    manager.create_constraints().await?;

    let mut summary = SeedSummary::default();

    for (code, name) in PRODUCTS {
        manager.create_product(code, name).await?;
        summary.products += 1;
    }
    for (code, name) in FUNCTIONALITIES {
        manager.create_functionality(code, name).await?;
        summary.functionalities += 1;
    }
    for (code, name) in COMPONENTS {
        manager.create_component(code, name).await?;
        summary.components += 1;
    }

    for (product, functionalities) in PRODUCT_ASSIGNMENTS {
        for functionality in *functionalities {
            manager
                .assign_functionality_to_product(product, functionality)
                .await?;
            summary.assignments += 1;
        }
    }
    for (component, functionalities) in COMPONENT_ASSIGNMENTS {
        for functionality in *functionalities {
            manager
                .assign_functionality_to_component(component, functionality)
                .await?;
            summary.assignments += 1;
        }
    }

    for (code, description, sla, functionality) in INCIDENTS {
        manager
            .create_incident(code, description, sla, functionality)
            .await?;
        summary.incidents += 1;
    }
    for (incident, date, procedure) in RESOLUTIONS {
        manager.create_resolution(incident, date, procedure).await?;
        summary.resolutions += 1;
    }

    tracing::info!(?summary, "Sample data loaded");
    Ok(summary)
}
