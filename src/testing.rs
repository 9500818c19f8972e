//! Shared test fixtures.

/// A configuration that passes the built-in catalog without an inventory lookup.
pub const VALID_TFVARS: &str = r#"
aws_region = "eu-west-1"

flag_create_new_vpc   = true
flag_use_existing_vpc = false
vpc_existing_id       = "REPLACE_ME"
vpc_new_public_subnets = ["10.0.0.0/24"]
vpc_new_private_subnets = [
  "10.0.1.0/24",
  "10.0.2.0/24",
]

flag_create_external_db       = true
flag_use_existing_external_db = false
flag_use_container_db         = false
db_existing_host              = "REPLACE_ME"
subnets_db = ["10.0.2.0/24"]

flag_create_external_redis = false
flag_use_container_redis   = true

flag_create_load_balancer = true
flag_use_private_cacert   = false
flag_do_not_use_https     = false
alb_certificate_arn       = "arn:aws:acm:eu-west-1:123456789012:certificate/abc"
subnets_alb = ["10.0.0.0/24"]

flag_make_instance_public  = false
flag_make_instance_private = true
subnets_ec2 = ["10.0.1.0/24"]

flag_enable_data_studio = false
flag_enable_groundswell = true
platform_container_version = "v23.4.1"

platform_server_url = "platform.example.com"
platform_db_driver  = "org.mariadb.jdbc.Driver"
platform_db_dialect = "org.hibernate.dialect.MySQL8Dialect"

default_tags = {
  Owner = "platform-team"
}
"#;
