pub use academix_models::academics::{
    Academic, AcademicCounts, AcademicDetail, AcademicFilterParams, CreateAcademicDto,
    UpdateAcademicDto, UpdateAcademicStatusDto,
};
