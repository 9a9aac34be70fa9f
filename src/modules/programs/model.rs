pub use academix_models::programs::{
    CreatePackageDto, CreateProgramDto, Package, PackageWithSchedules, Program, ProgramDetail,
    ProgramFilterParams, ProgramSummary, Schedule, ScheduleInput, UpdatePackageDto,
    UpdateProgramDto,
};
