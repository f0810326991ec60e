//! Codeword tables.
//!
//! One `u64` per tag id. Payload cell `(row, col)` is bit `row * n + col`
//! counted from the least significant bit, `n` being the payload side
//! length; a set bit is a white cell.

/// Tag36h11: 6x6 payload, minimum Hamming distance 11.
#[rustfmt::skip]
pub static TAG36H11_CODES: [u64; 587] = [
    0x0000_47b7_310b, 0x0009_c712_bec7, 0x0001_1273_34c1, 0x000b_3db8_2789,
    0x000e_495c_72d1, 0x000e_169b_7d93, 0x0001_59a1_90a5, 0x000d_a383_0123,
    0x000f_1c8d_ce3d, 0x0002_ed68_409c, 0x0003_57ef_0a86, 0x000d_afad_93d8,
    0x0005_78c4_3c14, 0x000c_f961_b690, 0x0008_84a6_edf2, 0x000c_43c3_6636,
    0x000a_7e06_756e, 0x000f_c409_27ec, 0x0007_310c_b972, 0x0009_8ee8_6e5d,
    0x0000_5dd5_d489, 0x0008_f035_5b05, 0x000c_a5f7_444f, 0x000b_aaf1_9871,
    0x0002_619d_07b5, 0x000a_91fe_d663, 0x0001_7b9a_5baf, 0x0004_2b5e_4e65,
    0x0002_7f93_ad96, 0x000a_da72_6312, 0x000f_f07d_6180, 0x0004_edee_1dc3,
    0x0000_a504_7c3b, 0x0007_a222_a935, 0x0004_992d_eb27, 0x0009_0948_65c6,
    0x0000_cceb_e54a, 0x0009_6caf_7ad6, 0x0006_f8b3_1646, 0x000a_77b1_d878,
    0x000d_cdbe_966a, 0x0008_e6bd_84c9, 0x0006_a656_ed19, 0x0007_5317_b841,
    0x0008_ad3d_20af, 0x0006_efdc_697d, 0x0002_7642_04c8, 0x0005_4c6d_469a,
    0x0004_34aa_4d58, 0x0002_3d80_a0ae, 0x0006_6b2b_3f11, 0x0003_6134_5923,
    0x0003_24f2_56e9, 0x000c_22f4_9b77, 0x0006_c431_a18a, 0x000c_3cb3_31dc,
    0x000d_6a66_c801, 0x0003_fb4e_94a1, 0x000f_0dea_e6cc, 0x000e_730f_f394,
    0x0008_b9d6_9a64, 0x0005_69b2_14e0, 0x000c_e613_9d2c, 0x0002_a8fa_d695,
    0x0002_55bb_81dd, 0x000e_a799_184b, 0x000c_7adc_5a42, 0x0006_ebf4_26b2,
    0x0002_c2e1_df27, 0x0007_a946_74d6, 0x000e_2c67_fc5a, 0x0008_e8af_b7a0,
    0x0005_39fb_d093, 0x0006_463f_9f4a, 0x0004_ea65_8ae4, 0x0003_3ae8_4d91,
    0x0001_8fc0_7131, 0x0009_7320_e9f5, 0x000e_3a89_2ae1, 0x0007_cd5b_f7cb,
    0x0005_8744_2472, 0x0002_46ad_e605, 0x000a_257a_38ec, 0x0006_d3a7_e7f3,
    0x0004_6629_a346, 0x0001_3097_7009, 0x0001_595e_f46d, 0x0009_7210_847a,
    0x0009_445b_c544, 0x0009_a9a4_214e, 0x0000_6a85_ab82, 0x0005_0d32_5136,
    0x0003_191b_854b, 0x000e_99d9_e27b, 0x0000_c786_5ce8, 0x0002_3d6f_c226,
    0x000a_60e8_a67f, 0x0003_ffd7_9140, 0x0001_4a0c_d49c, 0x000e_ccc5_b9ce,
    0x000f_bf04_a804, 0x0009_d9ed_e53e, 0x000d_9af7_0d92, 0x0004_7fd2_8256,
    0x0009_d03d_4c68, 0x0006_1456_27b0, 0x0005_b915_9c5b, 0x0007_9b72_a5cc,
    0x000b_7fe6_8517, 0x0004_4565_72e3, 0x0006_3bf3_b689, 0x000a_c1d9_6e2d,
    0x000c_727f_32ed, 0x0004_f76a_ee15, 0x0009_da52_396c, 0x0009_1c15_2579,
    0x0002_b042_62bf, 0x000e_d4fe_13c0, 0x0006_13db_9a0e, 0x000d_2e47_a43c,
    0x0000_1781_c64b, 0x0001_42ad_bdbb, 0x000f_37b5_c12b, 0x000e_e403_835d,
    0x0005_d98f_bc88, 0x0001_d0da_4305, 0x000d_e48a_88a4, 0x0007_564d_34f9,
    0x0003_0635_d4ae, 0x0002_b20a_2d24, 0x0000_0cb4_83fb, 0x0009_bc24_485b,
    0x000b_e236_9b40, 0x0007_4692_e968, 0x0000_37b5_6566, 0x0005_b8c6_227d,
    0x000e_d14d_250f, 0x000f_9403_7653, 0x0003_d523_8a15, 0x0006_b3de_54cd,
    0x000b_85c8_7f63, 0x0007_bccc_6fb4, 0x0000_efcb_9937, 0x0008_b31e_0355,
    0x0000_4c7c_5d2d, 0x000c_0ea5_6969, 0x0006_f8ab_889b, 0x000f_74ce_174f,
    0x0001_5653_4a28, 0x0005_55b9_4170, 0x0003_5aeb_d0e2, 0x0001_5917_48b4,
    0x0007_5a45_d10e, 0x000b_aa67_4068, 0x0002_90f9_ce82, 0x0002_3f3e_58eb,
    0x0009_3961_0d7c, 0x000c_5677_8e34, 0x000b_d52f_7812, 0x000c_20cb_3a8c,
    0x0006_b79b_463f, 0x000f_8164_cf13, 0x0000_3b3e_cd36, 0x0005_8131_bfa4,
    0x0000_d1f2_c5a6, 0x000a_69a3_6917, 0x0002_a081_d1c8, 0x000c_97a8_b458,
    0x000d_91fe_0f7e, 0x0000_7ee4_6459, 0x000a_a3b1_6202, 0x0006_d54e_c04b,
    0x0004_dd66_8c0c, 0x0000_990f_db78, 0x0004_0735_0fb7, 0x0007_6841_b2f5,
    0x000a_5966_113d, 0x0003_11f9_f7bc, 0x0001_8b23_5e3d, 0x0009_da81_4a4a,
    0x0000_a80f_6712, 0x000f_1e8e_2b1b, 0x000f_2468_8bba, 0x0004_329d_e25f,
    0x000a_8b28_e75b, 0x0003_14aa_7a8a, 0x000a_f328_6b2c, 0x0000_e581_cf74,
    0x000d_9f69_2d23, 0x0007_5760_55a7, 0x000d_6916_c6b2, 0x0000_8515_4902,
    0x0007_798c_0ede, 0x000b_ba9c_442d, 0x000c_7b78_9b09, 0x000d_7f4a_f4d1,
    0x0001_b3e4_88e9, 0x0002_a325_cc30, 0x0004_adb9_ac72, 0x0001_cfe1_167a,
    0x0009_6ff0_02ed, 0x000d_b198_7694, 0x0004_6fa0_bbe8, 0x000c_8d02_afca,
    0x0001_31bd_2a9d, 0x0009_6f9d_da08, 0x000a_85c4_524d, 0x000c_7271_e03e,
    0x0002_c407_550f, 0x0005_529f_e826, 0x0002_9bc5_0b18, 0x0001_94cf_a5b9,
    0x0008_8c79_d063, 0x0009_6c70_6357, 0x0004_d809_73d5, 0x0007_65a1_286a,
    0x0006_9f83_6da5, 0x0005_4374_fa25, 0x0007_97f5_5d7a, 0x000a_3734_94c0,
    0x0009_1a46_1cf3, 0x000a_b0b0_a819, 0x0001_9632_1f17, 0x000d_5ba6_4442,
    0x0005_a2e7_3090, 0x000a_d7dd_79c9, 0x0003_e815_5f38, 0x000b_10b6_0872,
    0x0005_813b_18fb, 0x000c_5df2_df94, 0x0007_0e12_a253, 0x000d_8ccf_cddc,
    0x0008_76d6_3f92, 0x0006_1451_c57c, 0x000c_2ae6_76dc, 0x0000_7f9c_6bc4,
    0x000a_75d3_2abf, 0x0003_35a7_03b8, 0x0005_7878_2f8a, 0x0000_327e_961b,
    0x0001_f289_bf41, 0x000a_e305_a0fb, 0x0006_61ae_5255, 0x0004_a95a_edd0,
    0x0008_0b9e_4189, 0x0008_cf45_8a53, 0x0001_bc85_9916, 0x0004_661e_623c,
    0x0009_9834_9fea, 0x0003_a883_87d6, 0x000c_d5c1_10fe, 0x000c_d97a_b8ae,
    0x0008_eb1e_56ee, 0x000d_04c0_2751, 0x0003_c46e_53b5, 0x0007_331a_80e4,
    0x0009_6f5f_21b3, 0x000d_58d2_061b, 0x0000_f271_1534, 0x0004_af86_a33b,
    0x0004_3702_64ef, 0x0008_877c_9aca, 0x0006_b6e5_b52c, 0x0000_264d_ae32,
    0x0001_e46b_3409, 0x0006_a757_3336, 0x0009_6b0f_2b7c, 0x0001_4d69_1bc8,
    0x0002_bf4b_1e87, 0x0003_46b9_7f6e, 0x000c_4f5c_f5ae, 0x000c_5767_79a8,
    0x000e_3c30_975b, 0x000b_6212_d0eb, 0x0006_c50c_2b92, 0x0000_5ad4_c73c,
    0x0004_798c_f748, 0x0003_2df9_1e33, 0x0009_516b_0590, 0x0002_2682_5f73,
    0x000e_614a_ac99, 0x000a_c760_c464, 0x0002_7acc_8c26, 0x000a_9c41_5c2d,
    0x000c_3bd5_c5c2, 0x000c_b497_1eff, 0x0007_cecf_e134, 0x000e_0f76_ccfc,
    0x000a_bbf6_c09e, 0x0007_490b_301a, 0x000f_386e_6ced, 0x0007_e998_4026,
    0x0003_a0bd_bf17, 0x0001_89d3_cd3a, 0x000c_1c9a_8add, 0x000b_8611_09d7,
    0x0008_9142_5fab, 0x000d_61c3_d178, 0x0008_b068_da79, 0x0009_4bf7_1336,
    0x0006_582c_c7ad, 0x000a_6f1a_b27f, 0x0004_ec80_95fd, 0x0001_f505_f5f1,
    0x000b_3be7_2a2b, 0x000a_1ce1_224a, 0x0000_9c77_71c2, 0x000a_4446_7e40,
    0x0008_4222_a609, 0x000f_c951_dd7d, 0x0006_fc53_2dc1, 0x0005_f537_069b,
    0x0003_0070_665a, 0x0007_c604_4a7d, 0x0006_2911_8a85, 0x0007_6716_f7de,
    0x0003_07a3_249f, 0x0003_698b_54ff, 0x0003_0dc8_0ba5, 0x0007_08fc_5cc2,
    0x0007_821a_9e6a, 0x0003_df07_72a0, 0x0006_4c08_71ea, 0x000d_463a_e5b5,
    0x0005_ee4e_51ef, 0x0007_aa11_63fa, 0x000c_f10d_0ea6, 0x000a_9d7b_6f57,
    0x000c_0a5f_795e, 0x0006_cb1e_043d, 0x000b_20d4_2bfd, 0x000e_24fe_c258,
    0x0003_feae_ab22, 0x0009_57c1_ddb0, 0x0007_4784_b222, 0x0007_4f70_233c,
    0x000c_89a9_7228, 0x0002_0319_f367, 0x0005_5c18_a765, 0x000d_f22e_a73f,
    0x000a_26bd_73ba, 0x000b_63f2_9682, 0x000c_e70b_35fa, 0x0009_53d1_608c,
    0x0009_ab10_2ba5, 0x000a_61ef_981c, 0x000b_3bfa_4361, 0x0002_7cf2_a465,
    0x0001_051b_76dd, 0x000f_e8c0_16eb, 0x0002_4d94_daee, 0x0005_7129_5a81,
    0x0006_067d_c83b, 0x0003_f725_0156, 0x0009_14f0_4199, 0x0009_48bd_7145,
    0x0005_630f_9fcb, 0x000d_88b3_b36f, 0x000c_1c6c_53cb, 0x000c_b601_c59f,
    0x0005_53ad_d735, 0x0008_f6c5_538e, 0x000a_4c2e_8f6c, 0x0006_d2b2_7b09,
    0x0001_a645_cba7, 0x0008_d7c5_f417, 0x000e_4bd5_4920, 0x0006_f62d_e9ff,
    0x0006_aeb6_9992, 0x0003_9dac_d611, 0x000d_ed1c_aed9, 0x000f_6aad_ed67,
    0x0006_aee5_4201, 0x0009_62d2_5d0d, 0x0005_1e9c_1796, 0x0005_0a2f_c9f5,
    0x0006_00c4_64ec, 0x0006_2498_cc89, 0x0001_8471_79ed, 0x0006_e083_ec05,
    0x0004_a11d_3609, 0x0007_cb4f_5f46, 0x0005_5b70_687b, 0x000f_959a_75e8,
    0x0009_cb29_66e1, 0x000c_a338_f1e1, 0x0009_7436_15f4, 0x0003_24c7_e302,
    0x0002_b0fc_1d7d, 0x0007_030e_e10c, 0x0000_2dea_92fe, 0x0000_f3a9_92d4,
    0x000a_3186_dc49, 0x000c_4ca5_5f3e, 0x0008_6143_8ac0, 0x000a_164f_0773,
    0x0008_298d_8062, 0x0004_1f0d_926e, 0x000b_f608_6e56, 0x000d_4759_5c73,
    0x0004_d217_4759, 0x0003_908f_ef4e, 0x000d_357e_dfa2, 0x000b_b422_cee4,
    0x000a_b792_fa2d, 0x0007_ed32_8df3, 0x0003_34b0_f1e2, 0x000f_76fa_9899,
    0x0003_9264_b39a, 0x0001_f879_e866, 0x0000_67ca_e1e1, 0x0001_ba6c_3705,
    0x0005_843e_ce25, 0x0000_d05f_9884, 0x0008_46d0_f3db, 0x0007_5d31_da9a,
    0x0001_678e_5526, 0x000f_d301_1f10, 0x000e_35e2_5693, 0x0001_1b8c_ed55,
    0x0001_f418_89c8, 0x0002_3aab_fbdd, 0x0006_18a2_dde6, 0x000a_0bdb_06a3,
    0x0004_bfb8_6597, 0x000e_35ec_3dab, 0x000b_25ec_c9cd, 0x0008_5b25_ca8c,
    0x0004_b27e_af20, 0x0004_49e4_8f71, 0x0003_fc25_25ad, 0x0001_8a99_11a7,
    0x000a_5ef6_128f, 0x0007_b570_3cb6, 0x0001_d044_6169, 0x0002_ac54_5191,
    0x000a_80ff_25cc, 0x0001_9398_95f9, 0x0001_b8fd_fda1, 0x0008_722f_5082,
    0x0002_fdf1_522f, 0x0004_9de8_7899, 0x0003_23c3_9c24, 0x0002_8143_44c1,
    0x000f_855d_0358, 0x000b_97d9_a6c1, 0x0005_ecd5_d8f7, 0x0006_ce42_c9a3,
    0x0008_f84b_f9c3, 0x000f_b6bc_b68e, 0x0007_a8f7_6a52, 0x0006_0773_192d,
    0x0008_c528_4bc5, 0x0005_907b_b11c, 0x0002_0520_ed8c, 0x000e_803e_a2ff,
    0x0009_a756_629d, 0x0000_b7ce_abcf, 0x0004_fcd1_4918, 0x0006_17e9_e920,
    0x0007_9df5_2029, 0x000b_dfab_86b9, 0x0002_c9d5_338d, 0x000b_253f_d51f,
    0x0008_4ff2_9541, 0x0004_6782_7092, 0x000f_71fd_1cb0, 0x0005_d802_afb0,
    0x0006_46d5_4296, 0x0007_8187_2fe9, 0x000c_381f_57c4, 0x0001_b667_6cf5,
    0x0000_22e7_c959, 0x0009_576a_8223, 0x000f_412e_4cfa, 0x0001_6ac1_736b,
    0x0006_9400_db05, 0x0009_87e5_d5cb, 0x0001_3562_a70f, 0x0004_63be_a4fb,
    0x000e_1a52_999c, 0x0001_fd93_8423, 0x000d_46a8_58af, 0x0004_84ab_06ce,
    0x0004_f5d7_b205, 0x0003_6d63_75aa, 0x000f_d332_21bb, 0x000c_e064_282d,
    0x0006_8534_3657, 0x0002_6e52_d034, 0x0008_9aeb_5df5, 0x0006_e476_4fef,
    0x0000_549c_1fcb, 0x000e_5425_4dd3, 0x0007_b5e0_e47b, 0x0002_4dbc_2de2,
    0x0004_f99e_10f7, 0x0009_c833_6d8b, 0x0004_07ac_6a5a, 0x0000_81fc_b922,
    0x0007_5ef7_7400, 0x0005_99cb_4bc0, 0x0000_2aa3_023a, 0x0008_4ae1_34d7,
    0x0009_0c7a_4ef2, 0x0000_1f32_94f7, 0x0008_b5d5_89dc, 0x0007_c229_4105,
    0x0009_b16f_12de, 0x0007_5a3d_0b5a, 0x0001_94a5_4f09, 0x0007_792d_f0ee,
    0x0006_ae2b_54b1, 0x000c_9ae6_712f, 0x0006_dd6e_4af0, 0x0008_2d42_01eb,
    0x0002_4375_ae99, 0x0005_d508_d6ff, 0x000a_3c7c_86bc, 0x0006_ffd9_24ac,
    0x000f_9d27_e54f, 0x000b_8aa2_f91a, 0x000f_a7cd_2c11, 0x0005_0b24_8cce,
    0x000c_6d01_6448, 0x000b_c02a_d728, 0x000a_a3ac_9105, 0x000c_55fd_c306,
    0x000f_3464_1161, 0x0002_e43b_acbc, 0x000c_75a6_9a8a, 0x0005_62f4_d5b2,
    0x000f_72ef_4fda, 0x0006_9bfa_0934, 0x000b_80e7_3321, 0x0005_c08a_e258,
    0x000e_efe6_7118, 0x000b_9a45_67d5, 0x0000_19e6_06cd, 0x0001_099c_77bb,
    0x000d_0be7_64a5, 0x0007_1163_2aa0, 0x0004_7ee9_7d06, 0x000a_e689_c363,
    0x0003_5aab_0c57, 0x000a_201d_c975, 0x0001_2e70_bff5, 0x0005_f4e2_59d5,
    0x0009_fe7d_c98b, 0x000f_80b9_c670, 0x000f_2997_960c, 0x000f_881f_0581,
    0x0001_51b6_cddb, 0x0002_a922_b418, 0x0009_3c5d_e240, 0x000b_2939_cfc0,
    0x0004_87b6_c1d5, 0x0008_dfe4_aefc, 0x0005_14a0_9a3b, 0x000a_67c5_edaf,
    0x0000_15e0_35f4, 0x000e_7491_77f6, 0x000f_0843_e62b, 0x000d_878b_5ee5,
    0x0001_e384_f397, 0x0005_136a_f2cb, 0x000b_32d7_5ebc, 0x000c_a9d1_0754,
    0x000d_e16c_9073, 0x000b_2458_55fe, 0x0003_1b03_9b33, 0x0007_ece5_3b3b,
    0x000d_4306_8a1f, 0x000f_57c7_a09a, 0x0008_be8a_077e, 0x0007_d32f_51d8,
    0x0008_49df_ebd7, 0x0003_f580_454d, 0x000e_1ad6_62f7, 0x0009_0256_c7d8,
    0x000d_2663_527b, 0x000b_2a45_8d4b, 0x000b_84ea_8347, 0x000a_43c8_153b,
    0x000b_4a69_7d50, 0x000c_a5e8_c6a0, 0x000b_ec5a_ebe0,
];

/// Tag16h5: 4x4 payload, minimum Hamming distance 5.
#[cfg(feature = "tag16h5")]
#[rustfmt::skip]
pub static TAG16H5_CODES: [u64; 30] = [
    0x0000_0000_e960, 0x0000_0000_91ce, 0x0000_0000_1d29, 0x0000_0000_707c,
    0x0000_0000_2d9e, 0x0000_0000_bd7b, 0x0000_0000_e721, 0x0000_0000_b3d1,
    0x0000_0000_d773, 0x0000_0000_34e9, 0x0000_0000_0d62, 0x0000_0000_0f7c,
    0x0000_0000_3086, 0x0000_0000_f898, 0x0000_0000_5a0b, 0x0000_0000_f302,
    0x0000_0000_60aa, 0x0000_0000_e68c, 0x0000_0000_3b40, 0x0000_0000_98f4,
    0x0000_0000_6bd8, 0x0000_0000_f4d4, 0x0000_0000_be13, 0x0000_0000_54e2,
    0x0000_0000_63b7, 0x0000_0000_a5fc, 0x0000_0000_7be3, 0x0000_0000_7618,
    0x0000_0000_b825, 0x0000_0000_bbaa,
];
