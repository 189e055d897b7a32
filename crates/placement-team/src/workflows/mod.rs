pub mod job_fairs;
