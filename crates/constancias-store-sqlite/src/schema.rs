//! SQL schema for the Constancias SQLite store.
//!
//! Table and column names match the database files written by earlier
//! versions of the application, so an existing `constancias.db` opens as-is.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Foreign keys are declared but `PRAGMA foreign_keys` is left at SQLite's
/// default (off). References are checked by the store on insert instead.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS instructores (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS cursos (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT UNIQUE NOT NULL
);

-- course <-> instructor
CREATE TABLE IF NOT EXISTS cursos_instructores (
    curso_id      INTEGER NOT NULL,
    instructor_id INTEGER NOT NULL,
    PRIMARY KEY (curso_id, instructor_id),
    FOREIGN KEY (curso_id)      REFERENCES cursos(id),
    FOREIGN KEY (instructor_id) REFERENCES instructores(id)
);

CREATE TABLE IF NOT EXISTS estudiantes (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre_completo TEXT UNIQUE NOT NULL
);

-- student <-> course
CREATE TABLE IF NOT EXISTS estudiantes_cursos (
    estudiante_id INTEGER NOT NULL,
    curso_id      INTEGER NOT NULL,
    PRIMARY KEY (estudiante_id, curso_id),
    FOREIGN KEY (estudiante_id) REFERENCES estudiantes(id),
    FOREIGN KEY (curso_id)      REFERENCES cursos(id)
);

-- Rows are never deleted; `activo = 0` hides a certificate from listings.
CREATE TABLE IF NOT EXISTS constancias (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo_unico     TEXT UNIQUE NOT NULL,
    estudiante_id    INTEGER NOT NULL,
    curso_id         INTEGER NOT NULL,
    fecha_generacion TEXT NOT NULL,   -- 'YYYY-MM-DD HH:MM:SS', America/Monterrey
    activo           INTEGER DEFAULT 1,
    FOREIGN KEY (estudiante_id) REFERENCES estudiantes(id),
    FOREIGN KEY (curso_id)      REFERENCES cursos(id)
);
";
